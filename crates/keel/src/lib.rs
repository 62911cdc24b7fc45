//! Keel: typed repository, predicate, and audit toolkit over external
//! queryable data sources.
//!
//! ## Crate layout
//! - `core`: entity identity, values, predicates, query descriptors, the
//!   generic repository, and audit stamping.
//! - `client`: boundary transports, the HTTP verb wrapper and the remote
//!   file client.
//!
//! The `prelude` module mirrors the surface most callers use.

pub use keel_client as client;
pub use keel_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use keel_core::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::client::{Auth, ClientError, HttpClient, RemoteConfig, RemoteFileClient};
    pub use crate::core::{
        DataSource as _, Entity, EntityKey as _, FieldDef, FieldRegistry, FieldValue as _,
        IncludeSpec, MemorySource, NestedDef, Operator, OrderDirection, Predicate, Query,
        Related, RelationDef, Repository, Session, Value, ValueKind,
        audit::{
            AuditSlot, AuditSpec, is_deleted, soft_delete, stamp_creation, stamp_deletion,
            stamp_modification, undelete,
        },
        entity::{entity_eq, entity_hash, is_transient},
    };
}
