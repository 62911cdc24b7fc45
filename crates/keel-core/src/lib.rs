//! Core runtime for keel: entity identity, the value model, typed
//! predicates, query descriptors, the generic repository, and audit
//! stamping.
//!
//! ## Module layout
//! - `value`: runtime field values, kind tags, comparison and coercion.
//! - `entity`: entity traits, const field registries, identity semantics.
//! - `predicate`: dynamic clause builder and boolean combinators.
//! - `query`: the composed read descriptor (filter/order/include/paging).
//! - `source`: the external queryable-source contract and the in-memory
//!   reference implementation.
//! - `repository`: generic CRUD composition over a source.
//! - `audit`: capability-based creation/modification/deletion stamping.
//! - `session`: the explicit acting-user context.

pub mod audit;
pub mod entity;
pub mod error;
pub mod predicate;
pub mod query;
pub mod repository;
pub mod session;
pub mod source;
pub mod value;

pub use entity::{Entity, EntityKey, FieldDef, FieldRegistry, NestedDef, Related, RelationDef};
pub use error::Error;
pub use predicate::{Operator, Predicate, PredicateError};
pub use query::{IncludeSpec, OrderDirection, OrderSpec, Query};
pub use repository::{Repository, RepositoryError};
pub use session::Session;
pub use source::{DataSource, MemorySource, SourceError};
pub use value::{FieldValue, Value, ValueKind};
