//! Persistence contract shared by every resource type

use crate::core::entity::Resource;
use crate::core::field::FieldError;
use crate::core::query::Page;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`ResourceStore`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Create was given a record that already carries an id
    #[error("{entity_type} already carries id '{id}'")]
    AlreadyIdentified { entity_type: String, id: Uuid },

    /// Replace was given a record without an id
    #[error("{entity_type} has no id to replace")]
    MissingIdentity { entity_type: String },

    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The backing store failed; nothing was changed
    #[error("failed to {operation} {entity_type}: {message}")]
    Persistence {
        entity_type: String,
        operation: String,
        message: String,
    },
}

impl From<FieldError> for StoreError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Unknown(field) => StoreError::UnknownField(field),
            FieldError::Invalid { field, message } => StoreError::InvalidField { field, message },
        }
    }
}

/// Store trait for one resource type
///
/// Every call is a single atomic unit against the backing store: either it
/// commits completely or it returns an error and leaves stored state as it
/// was. Records with `active == false` are invisible to `get`, `list`,
/// `replace`, `patch` and `delete`.
#[async_trait]
pub trait ResourceStore<T: Resource>: Send + Sync {
    /// Persist a new record, assigning its id and timestamps
    ///
    /// Fails with [`StoreError::AlreadyIdentified`] if `resource` has an id.
    async fn create(&self, resource: T) -> Result<T, StoreError>;

    /// Fetch an active record
    async fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError>;

    /// Whole-object replace of the record named by `resource.id`
    ///
    /// Copies every declared field and relationship; `id`, `created`,
    /// `updated` and `active` stay server-controlled.
    async fn replace(&self, resource: T) -> Result<T, StoreError>;

    /// Apply the named fields; server-controlled names are skipped
    ///
    /// Returns `Ok(None)` if no active record has this id.
    async fn patch(&self, id: &Uuid, fields: Map<String, Value>) -> Result<Option<T>, StoreError>;

    /// Soft-delete; returns whether an active record was deactivated
    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError>;

    /// Active records ordered by id, windowed by `page`
    ///
    /// Out-of-range and zero pages give an empty list, never an error.
    async fn list(&self, page: Page) -> Result<Vec<T>, StoreError>;
}
