use crate::entity::Entity;
use chrono::{DateTime, Utc};

///
/// AuditSlot
/// Typed accessor pair for one optional audit field.
///

pub struct AuditSlot<E, T> {
    pub get: fn(&E) -> T,
    pub set: fn(&mut E, T),
}

impl<E, T> Clone for AuditSlot<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for AuditSlot<E, T> {}

///
/// AuditSpec
///
/// Audit capabilities of an entity type, declared as independent optional
/// slots on its type descriptor. A `None` slot means the entity does not
/// carry that capability; detection is structural, never by concrete type.
///

pub struct AuditSpec<E> {
    pub creation_time: Option<AuditSlot<E, Option<DateTime<Utc>>>>,
    pub creator: Option<AuditSlot<E, Option<String>>>,
    pub modification_time: Option<AuditSlot<E, Option<DateTime<Utc>>>>,
    pub modifier: Option<AuditSlot<E, Option<String>>>,
    pub deleted: Option<AuditSlot<E, bool>>,
    pub deletion_time: Option<AuditSlot<E, Option<DateTime<Utc>>>>,
    pub deleter: Option<AuditSlot<E, Option<String>>>,
}

impl<E> AuditSpec<E> {
    /// Spec of an entity with no audit capabilities at all.
    pub const NONE: Self = Self {
        creation_time: None,
        creator: None,
        modification_time: None,
        modifier: None,
        deleted: None,
        deletion_time: None,
        deleter: None,
    };
}

impl<E> Clone for AuditSpec<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for AuditSpec<E> {}

// Blank acting-user identifiers count as "no user".
fn effective_user(user_id: Option<&str>) -> Option<&str> {
    user_id.map(str::trim).filter(|u| !u.is_empty())
}

/// Stamp creation metadata before an insert is handed to the source.
///
/// Requires the creation-time capability; without it the whole stamp is a
/// no-op. The creation time is set only while unset. The creator, when the
/// entity carries that capability and a user is known, is set only while
/// unset: first writer wins.
pub fn stamp_creation<E: Entity>(entity: &mut E, user_id: Option<&str>) {
    let Some(time_slot) = E::AUDIT.creation_time else {
        return;
    };

    if (time_slot.get)(entity).is_none() {
        (time_slot.set)(entity, Some(Utc::now()));
    }

    let Some(creator_slot) = E::AUDIT.creator else {
        return;
    };
    let Some(user) = effective_user(user_id) else {
        return;
    };
    if (creator_slot.get)(entity).is_some() {
        return;
    }

    (creator_slot.set)(entity, Some(user.to_owned()));
}

/// Stamp modification metadata before an update is handed to the source.
///
/// Unlike creation, the modification time is refreshed on every call and
/// the modifier always overwritten: an unknown user clears it.
pub fn stamp_modification<E: Entity>(entity: &mut E, user_id: Option<&str>) {
    if let Some(time_slot) = E::AUDIT.modification_time {
        (time_slot.set)(entity, Some(Utc::now()));
    }

    let Some(modifier_slot) = E::AUDIT.modifier else {
        return;
    };

    match effective_user(user_id) {
        Some(user) => (modifier_slot.set)(entity, Some(user.to_owned())),
        None => (modifier_slot.set)(entity, None),
    }
}

/// Stamp deletion metadata before a removal is handed to the source.
///
/// The deletion time is set only while unset. The deleter follows the
/// first-writer-wins rule of creation: a previously-set deleter is left
/// untouched; otherwise an unknown user clears and a known user sets.
pub fn stamp_deletion<E: Entity>(entity: &mut E, user_id: Option<&str>) {
    if let Some(time_slot) = E::AUDIT.deletion_time {
        if (time_slot.get)(entity).is_none() {
            (time_slot.set)(entity, Some(Utc::now()));
        }
    }

    let Some(deleter_slot) = E::AUDIT.deleter else {
        return;
    };
    if (deleter_slot.get)(entity).is_some() {
        return;
    }

    match effective_user(user_id) {
        Some(user) => (deleter_slot.set)(entity, Some(user.to_owned())),
        None => (deleter_slot.set)(entity, None),
    }
}

/// Mark the entity soft-deleted and stamp deletion metadata.
pub fn soft_delete<E: Entity>(entity: &mut E, user_id: Option<&str>) {
    if let Some(flag_slot) = E::AUDIT.deleted {
        (flag_slot.set)(entity, true);
    }

    stamp_deletion(entity, user_id);
}

/// Un-delete the entity: clear the soft-delete flag and reset deletion
/// metadata to absent.
pub fn undelete<E: Entity>(entity: &mut E) {
    if let Some(flag_slot) = E::AUDIT.deleted {
        (flag_slot.set)(entity, false);
    }
    if let Some(time_slot) = E::AUDIT.deletion_time {
        (time_slot.set)(entity, None);
    }
    if let Some(deleter_slot) = E::AUDIT.deleter {
        (deleter_slot.set)(entity, None);
    }
}

/// True when the entity carries the soft-delete capability and is marked
/// deleted.
#[must_use]
pub fn is_deleted<E: Entity>(entity: &E) -> bool {
    E::AUDIT
        .deleted
        .is_some_and(|flag_slot| (flag_slot.get)(entity))
}

///
/// TESTS
///
