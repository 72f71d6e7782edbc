//! iT-Agent Storage - In-memory entity repositories
//!
//! Every service owns one `InMemoryRepository` per entity it manages.
//! Mutations go through [`InMemoryRepository::update`], which applies a
//! closure to a scratch copy under the write lock and only commits it when
//! the closure succeeds, so a rejected change never leaves partial state.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use itagent_core::{
    AgentConfig, AgentTemplate, Capability, EntityId, Session, Task, Team, Tool, ToolLog,
};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// ENTITY TRAIT
// ============================================================================

/// A storable entity with a unique key.
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Display + Send + Sync + 'static;

    /// Human-readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    fn key(&self) -> Self::Key;
}

macro_rules! impl_entity {
    ($type:ty, $key:ty, $name:literal, $field:ident) => {
        impl Entity for $type {
            type Key = $key;
            const ENTITY_NAME: &'static str = $name;

            fn key(&self) -> Self::Key {
                self.$field.clone()
            }
        }
    };
}

impl_entity!(Session, EntityId, "Session", id);
impl_entity!(Task, EntityId, "Task", id);
impl_entity!(Tool, String, "Tool", id);
impl_entity!(ToolLog, EntityId, "Tool log", id);
impl_entity!(Team, EntityId, "Team", id);
impl_entity!(AgentTemplate, EntityId, "Template", id);
impl_entity!(Capability, EntityId, "Capability", id);
impl_entity!(AgentConfig, EntityId, "Agent config", id);

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

/// Thread-safe keyed store. Cloning shares the underlying map.
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    items: Arc<RwLock<HashMap<T::Key, T>>>,
}

impl<T: Entity> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entity. Fails if the key is taken.
    pub fn insert(&self, entity: T) -> StorageResult<()> {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        let key = entity.key();
        if items.contains_key(&key) {
            return Err(StorageError::AlreadyExists {
                entity: T::ENTITY_NAME,
                id: key.to_string(),
            });
        }
        items.insert(key, entity);
        Ok(())
    }

    /// Insert unless `conflict` matches an existing entity, atomically.
    ///
    /// Returns the conflicting entity on rejection.
    pub fn insert_unless(
        &self,
        entity: T,
        conflict: impl Fn(&T, &T) -> bool,
    ) -> StorageResult<Result<(), T>> {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        if let Some(existing) = items.values().find(|existing| conflict(existing, &entity)) {
            return Ok(Err(existing.clone()));
        }
        items.insert(entity.key(), entity);
        Ok(Ok(()))
    }

    pub fn get(&self, key: &T::Key) -> StorageResult<Option<T>> {
        let items = self.items.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    /// Like [`get`](Self::get) but maps absence to [`StorageError::NotFound`].
    pub fn require(&self, key: &T::Key) -> StorageResult<T> {
        self.get(key)?.ok_or_else(|| StorageError::NotFound {
            entity: T::ENTITY_NAME,
            id: key.to_string(),
        })
    }

    /// Snapshot of every stored entity, in no particular order.
    pub fn list(&self) -> StorageResult<Vec<T>> {
        let items = self.items.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(items.values().cloned().collect())
    }

    /// Snapshot of the entities matching `predicate`, in no particular order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> StorageResult<Vec<T>> {
        let items = self.items.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(items.values().filter(|e| predicate(e)).cloned().collect())
    }

    pub fn count(&self) -> StorageResult<usize> {
        let items = self.items.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(items.len())
    }

    /// Apply `f` to a copy of the entity and commit the copy if `f` succeeds.
    ///
    /// Returns `Ok(None)` when the key is absent. The write lock is held for
    /// the whole call, so concurrent updates of one entity serialize.
    pub fn update<R, E>(
        &self,
        key: &T::Key,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<Option<R>, E>
    where
        E: From<StorageError>,
    {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        let Some(current) = items.get(key) else {
            return Ok(None);
        };
        let mut draft = current.clone();
        let out = f(&mut draft)?;
        items.insert(key.clone(), draft);
        Ok(Some(out))
    }

    /// Run `f` against the whole map under a single write lock.
    ///
    /// For checks that span several entities and must not race the write
    /// that follows them. Changes `f` made before returning `Err` are kept,
    /// so validate first and mutate last.
    pub fn with_write<R, E>(
        &self,
        f: impl FnOnce(&mut HashMap<T::Key, T>) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        f(&mut items)
    }

    pub fn remove(&self, key: &T::Key) -> StorageResult<Option<T>> {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(items.remove(key))
    }

    /// Keep only the entities matching `keep`; returns how many were removed.
    pub fn retain(&self, keep: impl Fn(&T) -> bool) -> StorageResult<usize> {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        let before = items.len();
        items.retain(|_, e| keep(e));
        Ok(before - items.len())
    }

    /// Clear all stored data.
    pub fn clear(&self) -> StorageResult<()> {
        let mut items = self.items.write().map_err(|_| StorageError::LockPoisoned)?;
        items.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use itagent_core::{new_entity_id, TaskStatus};
    use proptest::prelude::*;

    fn task(name: &str) -> Task {
        Task::new(new_entity_id(), name, Utc::now())
    }

    #[test]
    fn test_insert_get_and_duplicate() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        let t = task("a");
        repo.insert(t.clone())?;
        assert_eq!(repo.get(&t.id)?, Some(t.clone()));
        assert_eq!(
            repo.insert(t.clone()),
            Err(StorageError::AlreadyExists {
                entity: "Task",
                id: t.id.to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn test_require_missing_is_not_found() {
        let repo = InMemoryRepository::<Task>::new();
        let id = new_entity_id();
        assert!(matches!(
            repo.require(&id),
            Err(StorageError::NotFound { entity: "Task", .. })
        ));
    }

    #[test]
    fn test_failed_update_leaves_entity_untouched() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        let t = task("a");
        repo.insert(t.clone())?;

        let result: Result<Option<()>, StorageError> = repo.update(&t.id, |draft| {
            draft.status = TaskStatus::Running;
            Err(StorageError::LockPoisoned)
        });
        assert!(result.is_err());
        assert_eq!(repo.require(&t.id)?.status, TaskStatus::Pending);

        let applied: Result<Option<TaskStatus>, StorageError> = repo.update(&t.id, |draft| {
            draft.status = TaskStatus::Running;
            Ok(draft.status)
        });
        assert_eq!(applied?, Some(TaskStatus::Running));
        assert_eq!(repo.require(&t.id)?.status, TaskStatus::Running);
        Ok(())
    }

    #[test]
    fn test_update_missing_returns_none() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        let out: Option<()> = repo.update(&new_entity_id(), |_| Ok::<_, StorageError>(()))?;
        assert!(out.is_none());
        Ok(())
    }

    #[test]
    fn test_insert_unless_conflict() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        repo.insert(task("same"))?;
        let rejected = repo.insert_unless(task("same"), |a, b| a.name == b.name)?;
        assert!(rejected.is_err());
        let accepted = repo.insert_unless(task("other"), |a, b| a.name == b.name)?;
        assert!(accepted.is_ok());
        assert_eq!(repo.count()?, 2);
        Ok(())
    }

    #[test]
    fn test_with_write_sees_and_mutates_whole_map() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        let parent = task("parent");
        repo.insert(parent.clone())?;

        let mut child = task("child");
        child.parent_task_id = Some(parent.id);
        let inserted = repo.with_write(|items| {
            if !items.contains_key(&parent.id) {
                return Err(StorageError::NotFound {
                    entity: Task::ENTITY_NAME,
                    id: parent.id.to_string(),
                });
            }
            items.insert(child.id, child.clone());
            Ok(items.len())
        })?;
        assert_eq!(inserted, 2);

        let missing = repo.with_write(|items| match items.get(&new_entity_id()) {
            Some(_) => Ok(()),
            None => Err(StorageError::LockPoisoned),
        });
        assert!(missing.is_err());
        assert_eq!(repo.count()?, 2);
        Ok(())
    }

    #[test]
    fn test_with_write_serializes_read_modify_write() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        let counter = task("counter");
        repo.insert(counter.clone())?;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                let id = counter.id;
                std::thread::spawn(move || -> StorageResult<()> {
                    for _ in 0..50 {
                        repo.with_write(|items| {
                            let seen = items.get(&id).map_or(0, |t| t.tags.len());
                            if let Some(t) = items.get_mut(&id) {
                                t.tags.insert(seen.to_string());
                            }
                            Ok::<_, StorageError>(())
                        })?;
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle.join().map_err(|_| StorageError::LockPoisoned)??;
        }

        let tags = repo.require(&counter.id)?.tags;
        // A lost update would insert a tag that already exists.
        assert_eq!(tags.len(), 400);
        Ok(())
    }

    #[test]
    fn test_clones_share_state() -> StorageResult<()> {
        let repo = InMemoryRepository::<Task>::new();
        let shared = repo.clone();
        repo.insert(task("x"))?;
        assert_eq!(shared.count()?, 1);
        shared.clear()?;
        assert_eq!(repo.count()?, 0);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_retain_removes_exactly_the_rejected(names in prop::collection::vec("[a-z]{1,6}", 0..30)) {
            let repo = InMemoryRepository::<Task>::new();
            for name in &names {
                repo.insert(task(name)).map_err(|e| TestCaseError::fail(e.to_string()))?;
            }
            let short = names.iter().filter(|n| n.len() <= 3).count();
            let removed = repo
                .retain(|t| t.name.len() > 3)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(removed, short);
            prop_assert_eq!(
                repo.count().map_err(|e| TestCaseError::fail(e.to_string()))?,
                names.len() - short
            );
        }
    }
}
