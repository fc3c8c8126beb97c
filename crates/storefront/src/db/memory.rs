//! In-memory repository.
//!
//! Evaluates criteria against entities held in a `Vec`, in insertion order.
//! Used by tests and by local runs without a database.

use std::sync::RwLock;

use async_trait::async_trait;
use shopfloor_core::{Criteria, Entity, EntityCollection, ReadContext};
use tracing::instrument;

use super::{EntityRepository, EntitySearchResult, RepositoryError};

/// Repository backed by a `Vec` behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryRepository<E> {
    entities: RwLock<Vec<E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    /// Create a repository holding `entities`.
    #[must_use]
    pub fn new(entities: impl IntoIterator<Item = E>) -> Self {
        Self {
            entities: RwLock::new(entities.into_iter().collect()),
        }
    }

    /// Insert or replace an entity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the lock is poisoned.
    pub fn upsert(&self, entity: E) -> Result<(), RepositoryError> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let id = entity.id();
        if let Some(existing) = entities.iter_mut().find(|e| e.id() == id) {
            *existing = entity;
        } else {
            entities.push(entity);
        }
        Ok(())
    }

    /// Remove an entity by id, returning it if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the lock is poisoned.
    pub fn remove(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let mut entities = self
            .entities
            .write()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
        let position = entities.iter().position(|e| e.id() == id);
        Ok(position.map(|index| entities.remove(index)))
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for InMemoryRepository<E> {
    #[instrument(skip_all, fields(entity = E::ENTITY_NAME))]
    async fn search(
        &self,
        criteria: &Criteria,
        _context: &ReadContext,
    ) -> Result<EntitySearchResult<E>, RepositoryError> {
        let entities = self
            .entities
            .read()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        let found: EntityCollection<E> = entities
            .iter()
            .filter(|entity| criteria.matches(*entity))
            .map(|entity| {
                let mut entity = entity.clone();
                entity.retain_associations(criteria);
                entity
            })
            .collect();

        tracing::debug!(total = found.len(), "in-memory search");
        Ok(EntitySearchResult::new(found))
    }
}
