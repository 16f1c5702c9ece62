//! In-memory implementation of ResourceStore for testing and development

use crate::core::entity::{Resource, SERVER_CONTROLLED_FIELDS};
use crate::core::query::Page;
use crate::core::store::{ResourceStore, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory resource store
///
/// Records are kept in a `BTreeMap` keyed by id, so listing is ordered by
/// identity. Every mutating call stages its change on a copy and commits it
/// inside one write-lock section; a poisoned lock fails the call with
/// [`StoreError::Persistence`] before anything is written.
pub struct InMemoryStore<T> {
    records: Arc<RwLock<BTreeMap<Uuid, T>>>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<T: Resource> InMemoryStore<T> {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of records held, inactive ones included
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read("count")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Fetch a record whatever its `active` flag
    ///
    /// Soft-deleted records stay in storage; this is the only way to see them.
    pub fn get_including_inactive(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        Ok(self.read("get")?.get(id).cloned())
    }

    fn read(&self, operation: &str) -> Result<RwLockReadGuard<'_, BTreeMap<Uuid, T>>, StoreError> {
        self.records
            .read()
            .map_err(|e| Self::persistence(operation, format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self, operation: &str) -> Result<RwLockWriteGuard<'_, BTreeMap<Uuid, T>>, StoreError> {
        self.records
            .write()
            .map_err(|e| Self::persistence(operation, format!("Failed to acquire write lock: {}", e)))
    }

    fn persistence(operation: &str, message: String) -> StoreError {
        tracing::error!(
            resource = T::resource_name(),
            operation,
            %message,
            "store operation failed"
        );
        StoreError::Persistence {
            entity_type: T::resource_name_singular().to_string(),
            operation: operation.to_string(),
            message,
        }
    }

    fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound {
            entity_type: T::resource_name_singular().to_string(),
            id,
        }
    }
}

impl<T: Resource> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Resource> ResourceStore<T> for InMemoryStore<T> {
    async fn create(&self, mut resource: T) -> Result<T, StoreError> {
        if let Some(id) = resource.id() {
            return Err(StoreError::AlreadyIdentified {
                entity_type: T::resource_name_singular().to_string(),
                id,
            });
        }

        let mut records = self.write("create")?;
        let id = resource.meta_mut().stamp_new();
        records.insert(id, resource.clone());

        tracing::debug!(resource = T::resource_name(), %id, "created");
        Ok(resource)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        let records = self.read("get")?;
        Ok(records.get(id).filter(|r| r.is_active()).cloned())
    }

    async fn replace(&self, resource: T) -> Result<T, StoreError> {
        let id = resource.id().ok_or_else(|| StoreError::MissingIdentity {
            entity_type: T::resource_name_singular().to_string(),
        })?;

        let mut records = self.write("replace")?;
        let mut staged = records
            .get(&id)
            .filter(|r| r.is_active())
            .cloned()
            .ok_or_else(|| Self::not_found(id))?;

        staged.replace_fields(resource);
        staged.meta_mut().touch();
        records.insert(id, staged.clone());

        tracing::debug!(resource = T::resource_name(), %id, "replaced");
        Ok(staged)
    }

    async fn patch(&self, id: &Uuid, fields: Map<String, Value>) -> Result<Option<T>, StoreError> {
        let mut records = self.write("patch")?;
        let Some(mut staged) = records.get(id).filter(|r| r.is_active()).cloned() else {
            return Ok(None);
        };

        for (name, value) in fields {
            if SERVER_CONTROLLED_FIELDS.contains(&name.as_str()) {
                continue;
            }
            staged.apply_field(&name, value)?;
        }

        staged.meta_mut().touch();
        records.insert(*id, staged.clone());

        tracing::debug!(resource = T::resource_name(), %id, "patched");
        Ok(Some(staged))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        let mut records = self.write("delete")?;
        match records.get_mut(id) {
            Some(record) if record.is_active() => {
                record.meta_mut().deactivate();
                tracing::debug!(resource = T::resource_name(), %id, "soft-deleted");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, page: Page) -> Result<Vec<T>, StoreError> {
        if !page.is_selectable() {
            return Ok(Vec::new());
        }
        let records = self.read("list")?;
        Ok(records
            .values()
            .filter(|r| r.is_active())
            .skip(page.offset())
            .take(page.limit)
            .cloned()
            .collect())
    }
}
