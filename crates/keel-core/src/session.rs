///
/// Session
///
/// Caller context threaded explicitly into the repository: the acting user
/// id, when one is known. An anonymous session carries no user; audit
/// stamping then records no actor.
///

#[derive(Clone, Debug, Default)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_session_has_no_user() {
        assert_eq!(Session::anonymous().user_id(), None);
        assert_eq!(Session::default().user_id(), None);
    }

    #[test]
    fn session_exposes_its_user() {
        assert_eq!(Session::new("alice").user_id(), Some("alice"));
    }
}
