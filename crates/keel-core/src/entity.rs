use crate::{
    audit::AuditSpec,
    value::{FieldValue, Value, ValueKind},
};
use std::{
    fmt::Debug,
    hash::{DefaultHasher, Hash, Hasher},
};
use ulid::Ulid;
use uuid::Uuid;

///
/// EntityKey
///
/// Primitive type usable as an entity's primary key. A key is *transient*
/// while it still holds the type's unassigned sentinel: the default value
/// for every key type, and additionally any value <= 0 for the signed
/// integer family (external ORMs hand out negative placeholder ids when
/// attaching new rows).
///

pub trait EntityKey:
    Clone + Debug + Default + Eq + Ord + Hash + FieldValue + Send + Sync + 'static
{
    fn is_transient_key(&self) -> bool {
        *self == Self::default()
    }
}

impl EntityKey for i32 {
    fn is_transient_key(&self) -> bool {
        *self <= 0
    }
}

impl EntityKey for i64 {
    fn is_transient_key(&self) -> bool {
        *self <= 0
    }
}

impl EntityKey for u32 {}
impl EntityKey for u64 {}
impl EntityKey for String {}
impl EntityKey for Ulid {}
impl EntityKey for Uuid {}

///
/// Entity
///
/// Declared facts about a persisted entity type: its name, its primary key,
/// a compile-time field registry (path string -> typed accessor), and an
/// optional audit capability spec. The registry replaces any form of
/// runtime introspection; a field that is not registered does not exist as
/// far as filtering and ordering are concerned.
///

pub trait Entity: Clone + Debug + Send + Sync + Sized + 'static {
    type Key: EntityKey;

    const NAME: &'static str;
    const PRIMARY_KEY: &'static str;
    const FIELDS: FieldRegistry<Self>;
    const AUDIT: AuditSpec<Self> = AuditSpec::NONE;

    fn key(&self) -> Self::Key;
}

///
/// FieldDef
/// One registered field: path segment, declared kind, typed accessor.
///

pub struct FieldDef<E> {
    pub name: &'static str,
    pub kind: ValueKind,
    pub get: fn(&E) -> Value,
}

///
/// NestedDef
///
/// Fields reachable through a one-level-deep dotted path. The accessor of
/// each child field reaches through the parent, so resolution stays a flat
/// lookup at evaluation time.
///

pub struct NestedDef<E: 'static> {
    pub name: &'static str,
    pub fields: &'static [FieldDef<E>],
}

///
/// FieldRegistry
///

pub struct FieldRegistry<E: 'static> {
    fields: &'static [FieldDef<E>],
    nested: &'static [NestedDef<E>],
}

impl<E> FieldRegistry<E> {
    #[must_use]
    pub const fn new(
        fields: &'static [FieldDef<E>],
        nested: &'static [NestedDef<E>],
    ) -> Self {
        Self { fields, nested }
    }

    /// Resolve a field path: one segment directly, two segments through the
    /// nested section. Deeper paths are unsupported.
    pub fn resolve(&self, path: &str) -> Result<&'static FieldDef<E>, FieldPathError> {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();

        let Some(child) = segments.next() else {
            return self
                .fields
                .iter()
                .find(|f| f.name == head)
                .ok_or(FieldPathError::Unknown);
        };

        if segments.next().is_some() {
            return Err(FieldPathError::TooDeep);
        }

        self.nested
            .iter()
            .find(|n| n.name == head)
            .and_then(|n| n.fields.iter().find(|f| f.name == child))
            .ok_or(FieldPathError::Unknown)
    }
}

///
/// FieldPathError
/// Raw resolution failure; callers attach entity and path context.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldPathError {
    Unknown,
    TooDeep,
}

///
/// RelationDef
/// A named to-many relation used by the existential filter form.
///

pub struct RelationDef<E, R> {
    pub name: &'static str,
    pub get: fn(&E) -> &[R],
}

///
/// Related
/// Declares the to-many relations of `Self` that hold `R` elements.
///

pub trait Related<R: Entity>: Entity {
    const RELATIONS: &'static [RelationDef<Self, R>];
}

///
/// Identity semantics
///

/// True while the entity has not been assigned a persisted identity.
#[must_use]
pub fn is_transient<E: Entity>(entity: &E) -> bool {
    entity.key().is_transient_key()
}

/// Entity equality: reference-identical instances are equal before anything
/// else is consulted; two transient entities are never equal; otherwise
/// entities are equal when their keys are.
#[must_use]
pub fn entity_eq<E: Entity>(a: &E, b: &E) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }

    if is_transient(a) && is_transient(b) {
        return false;
    }

    a.key() == b.key()
}

/// Hash derived from the entity's key.
#[must_use]
pub fn entity_hash<E: Entity>(entity: &E) -> u64 {
    let mut hasher = DefaultHasher::new();
    entity.key().hash(&mut hasher);
    hasher.finish()
}

///
/// TESTS
///
