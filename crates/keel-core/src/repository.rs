use crate::{
    audit::{stamp_creation, stamp_deletion, stamp_modification},
    entity::{Entity, is_transient},
    error::Error,
    predicate::{Operator, Predicate},
    query::{IncludeSpec, Query},
    session::Session,
    source::DataSource,
};
use std::{fmt::Debug, marker::PhantomData, sync::Arc};
use thiserror::Error as ThisError;
use tracing::debug;

///
/// Repository
///
/// Generic data access over one entity type against an external queryable
/// source. The repository holds no state between calls beyond the source
/// handle and the session, so any number of instances may safely share one
/// source.
///
/// Writes stamp audit metadata (with the session's acting user) before the
/// entity is handed to the source; the caller commits.
///

pub struct Repository<E: Entity, S: DataSource<E>> {
    source: Arc<S>,
    session: Session,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, S: DataSource<E>> Clone for Repository<E, S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            session: self.session.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, S: DataSource<E>> Repository<E, S> {
    #[must_use]
    pub const fn new(source: Arc<S>, session: Session) -> Self {
        Self {
            source,
            session,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Get one entity by primary key.
    pub async fn get(&self, key: E::Key) -> Result<Option<E>, Error> {
        self.get_with(key, None, false).await
    }

    /// Get one entity by primary key with an eager-load spec and tracking
    /// control.
    pub async fn get_with(
        &self,
        key: E::Key,
        include: Option<IncludeSpec>,
        track: bool,
    ) -> Result<Option<E>, Error> {
        let predicate = Predicate::build(E::PRIMARY_KEY, Operator::Eq, key)?;

        let mut query = Query::new().filter(predicate);
        if let Some(include) = include {
            query = query.include(include);
        }
        if track {
            query = query.track();
        }

        Ok(self.source.fetch(query).await?.into_iter().next())
    }

    /// First entity satisfying the predicate, or nothing.
    pub async fn first(
        &self,
        predicate: Predicate<E>,
        include: Option<IncludeSpec>,
        track: bool,
    ) -> Result<Option<E>, Error> {
        let mut query = Query::new().filter(predicate);
        if let Some(include) = include {
            query = query.include(include);
        }
        if track {
            query = query.track();
        }

        Ok(self.source.fetch(query).await?.into_iter().next())
    }

    /// Every entity satisfying the descriptor. An unbounded query is
    /// allowed to materialize the whole extent; supply paging for bounded
    /// memory.
    pub async fn list(&self, query: Query<E>) -> Result<Vec<E>, Error> {
        Ok(self.source.fetch(query).await?)
    }

    /// The whole extent, unfiltered.
    pub async fn list_all(&self) -> Result<Vec<E>, Error> {
        self.list(Query::new()).await
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Stage an entity for insertion; creation audit is stamped first.
    pub async fn insert(&self, mut entity: E) -> Result<E, Error> {
        stamp_creation(&mut entity, self.session.user_id());
        debug!(entity = E::NAME, "staging insert");
        self.source.add(entity.clone()).await?;

        Ok(entity)
    }

    /// Stage several entities for insertion.
    pub async fn insert_many(&self, entities: Vec<E>) -> Result<Vec<E>, Error> {
        let mut stamped = Vec::with_capacity(entities.len());
        for mut entity in entities {
            stamp_creation(&mut entity, self.session.user_id());
            stamped.push(entity);
        }

        debug!(entity = E::NAME, count = stamped.len(), "staging inserts");
        self.source.add_many(stamped.clone()).await?;

        Ok(stamped)
    }

    /// Insert when the entity is still transient, update otherwise.
    pub async fn upsert(&self, entity: E) -> Result<E, Error> {
        if is_transient(&entity) {
            self.insert(entity).await
        } else {
            self.update(entity).await
        }
    }

    /// Stage an entity as modified; modification audit is stamped first.
    pub async fn update(&self, mut entity: E) -> Result<E, Error> {
        stamp_modification(&mut entity, self.session.user_id());
        debug!(entity = E::NAME, "staging update");
        self.source.mark_modified(entity.clone()).await?;

        Ok(entity)
    }

    /// Load by key, apply the mutation, stage the result as modified.
    ///
    /// The mutation is never invoked when nothing was loaded; the call
    /// fails with a not-found error instead.
    pub async fn update_by_key(
        &self,
        key: E::Key,
        mutate: impl FnOnce(&mut E) + Send,
    ) -> Result<E, Error> {
        let Some(mut entity) = self.get_with(key.clone(), None, true).await? else {
            return Err(RepositoryError::not_found::<E>(&key).into());
        };

        mutate(&mut entity);
        stamp_modification(&mut entity, self.session.user_id());
        self.source.mark_modified(entity.clone()).await?;

        Ok(entity)
    }

    /// Stage an entity for removal; deletion audit is stamped first.
    pub async fn delete(&self, mut entity: E) -> Result<(), Error> {
        stamp_deletion(&mut entity, self.session.user_id());
        debug!(entity = E::NAME, "staging delete");
        self.source.remove(entity).await?;

        Ok(())
    }

    /// Load by key and stage the entity for removal; absence is an error.
    pub async fn delete_by_key(&self, key: E::Key) -> Result<(), Error> {
        let Some(entity) = self.get_with(key.clone(), None, true).await? else {
            return Err(RepositoryError::not_found::<E>(&key).into());
        };

        self.delete(entity).await
    }

    /// Delete every entity matching the predicate.
    ///
    /// Every match is materialized (tracked) before deletion, one removal
    /// per entity: simplicity traded against scalability by contract.
    /// Callers with large match sets must bound their predicates.
    pub async fn delete_matching(&self, predicate: Predicate<E>) -> Result<usize, Error> {
        let matched = self
            .source
            .fetch(Query::new().filter(predicate).track())
            .await?;
        let count = matched.len();
        debug!(entity = E::NAME, count, "deleting matched set");

        for entity in matched {
            self.delete(entity).await?;
        }

        Ok(count)
    }

    /// Apply all staged work on the underlying source.
    pub async fn commit(&self) -> Result<usize, Error> {
        Ok(self.source.commit().await?)
    }
}

///
/// RepositoryError
///

#[derive(Debug, ThisError)]
pub enum RepositoryError {
    #[error("no such entity; type '{entity}', key {key}")]
    NotFound { entity: &'static str, key: String },
}

impl RepositoryError {
    fn not_found<E: Entity>(key: &impl Debug) -> Self {
        Self::NotFound {
            entity: E::NAME,
            key: format!("{key:?}"),
        }
    }
}
