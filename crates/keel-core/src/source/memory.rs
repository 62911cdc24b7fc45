use crate::{
    entity::Entity,
    query::{OrderDirection, Query},
    source::{DataSource, SourceError},
    value::strict_value_order,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;

///
/// MemorySource
///
/// Reference implementation of [`DataSource`] over plain vectors. Rows keep
/// insertion order, which makes it the fixture of choice for paging and
/// ordering semantics; it is also the reference for how a descriptor must
/// be applied (filter, then order, then skip/take).
///
/// Staged writes live in a pending log until `commit`, mirroring an
/// external unit-of-work. The tracking flag is accepted and ignored: rows
/// are always returned as detached clones.
///

pub struct MemorySource<E: Entity> {
    rows: RwLock<Vec<E>>,
    pending: RwLock<Vec<PendingWrite<E>>>,
}

enum PendingWrite<E> {
    Add(E),
    Modify(E),
    Remove(E),
}

impl<E: Entity> MemorySource<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            pending: RwLock::new(Vec::new()),
        }
    }

    /// A source pre-populated with committed rows.
    #[must_use]
    pub fn with_rows(rows: Vec<E>) -> Self {
        Self {
            rows: RwLock::new(rows),
            pending: RwLock::new(Vec::new()),
        }
    }

    /// Number of committed rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn sort(rows: &mut [E], query: &Query<E>) -> Result<(), SourceError> {
        let Some(order) = query.order() else {
            return Ok(());
        };

        let mut keys = Vec::with_capacity(order.fields.len());
        for (path, direction) in &order.fields {
            let field =
                E::FIELDS
                    .resolve(path)
                    .map_err(|_| SourceError::UnknownField {
                        entity: E::NAME,
                        path: path.clone(),
                    })?;
            keys.push((field.get, *direction));
        }

        rows.sort_by(|a, b| {
            for (get, direction) in &keys {
                let mut ord = strict_value_order(&get(a), &get(b));
                if *direction == OrderDirection::Desc {
                    ord = ord.reverse();
                }
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        Ok(())
    }

    fn page(rows: Vec<E>, query: &Query<E>) -> Vec<E> {
        let skip = usize::try_from(query.skip().unwrap_or(0)).unwrap_or(usize::MAX);
        match query.take() {
            Some(take) => rows
                .into_iter()
                .skip(skip)
                .take(usize::try_from(take).unwrap_or(usize::MAX))
                .collect(),
            None => rows.into_iter().skip(skip).collect(),
        }
    }
}

impl<E: Entity> Default for MemorySource<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> DataSource<E> for MemorySource<E> {
    async fn fetch(&self, query: Query<E>) -> Result<Vec<E>, SourceError> {
        let mut matched: Vec<E> = {
            let rows = self.rows.read();
            rows.iter()
                .filter(|row| query.predicate().is_none_or(|p| p.matches(row)))
                .cloned()
                .collect()
        };

        // ordering must precede paging; skip/take over an unordered extent
        // is non-deterministic
        Self::sort(&mut matched, &query)?;

        // includes are satisfied trivially: rows are materialized whole

        Ok(Self::page(matched, &query))
    }

    async fn add(&self, entity: E) -> Result<(), SourceError> {
        self.pending.write().push(PendingWrite::Add(entity));
        Ok(())
    }

    async fn mark_modified(&self, entity: E) -> Result<(), SourceError> {
        self.pending.write().push(PendingWrite::Modify(entity));
        Ok(())
    }

    async fn remove(&self, entity: E) -> Result<(), SourceError> {
        self.pending.write().push(PendingWrite::Remove(entity));
        Ok(())
    }

    async fn commit(&self) -> Result<usize, SourceError> {
        let staged = std::mem::take(&mut *self.pending.write());
        let mut rows = self.rows.write();
        let applied = staged.len();

        // fail-fast and non-atomic: earlier writes of a failed batch remain
        for write in staged {
            match write {
                PendingWrite::Add(entity) => rows.push(entity),
                PendingWrite::Modify(entity) => {
                    let key = entity.key();
                    match rows.iter_mut().find(|row| row.key() == key) {
                        Some(slot) => *slot = entity,
                        None => {
                            return Err(SourceError::MissingRow {
                                entity: E::NAME,
                                key: format!("{key:?}"),
                            });
                        }
                    }
                }
                PendingWrite::Remove(entity) => {
                    let key = entity.key();
                    rows.retain(|row| row.key() != key);
                }
            }
        }

        Ok(applied)
    }
}

///
/// TESTS
///
