mod memory;

pub use memory::MemorySource;

use crate::{entity::Entity, query::Query};
use async_trait::async_trait;
use thiserror::Error as ThisError;

///
/// DataSource
///
/// The external queryable source the repository composes against: one
/// extent of entities supporting descriptor-driven reads and staged
/// mutations with an explicit commit.
///
/// Reads MUST apply the descriptor in order: filter, then ordering, then
/// includes, then skip/take. Mutations are staged; nothing is visible to
/// `fetch` until `commit`. Dropping an in-flight future cancels the
/// operation without touching entities already materialized.
///

#[async_trait]
pub trait DataSource<E: Entity>: Send + Sync {
    /// Materialize every entity matching the descriptor.
    async fn fetch(&self, query: Query<E>) -> Result<Vec<E>, SourceError>;

    /// Stage an entity for addition.
    async fn add(&self, entity: E) -> Result<(), SourceError>;

    /// Stage several entities for addition.
    async fn add_many(&self, entities: Vec<E>) -> Result<(), SourceError> {
        for entity in entities {
            self.add(entity).await?;
        }
        Ok(())
    }

    /// Stage an entity as modified.
    async fn mark_modified(&self, entity: E) -> Result<(), SourceError>;

    /// Stage an entity for removal.
    async fn remove(&self, entity: E) -> Result<(), SourceError>;

    /// Apply all staged work; returns the number of writes applied.
    async fn commit(&self) -> Result<usize, SourceError>;
}

///
/// SourceError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("source backend failure: {0}")]
    Backend(String),

    #[error("cannot apply staged write: no row with key {key} for entity '{entity}'")]
    MissingRow { entity: &'static str, key: String },

    #[error("unknown field '{path}' on entity '{entity}'")]
    UnknownField { entity: &'static str, path: String },
}
