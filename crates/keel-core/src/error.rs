use crate::{predicate::PredicateError, repository::RepositoryError, source::SourceError};
use thiserror::Error as ThisError;

///
/// Error
/// Crate-level aggregation of the module error surfaces.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl Error {
    /// True when this error is the not-found outcome of a keyed operation.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::NotFound { .. }))
    }
}
