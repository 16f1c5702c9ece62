//! Typed error handling for restbase
//!
//! Errors are grouped by category so callers can match on what went wrong
//! instead of inspecting a generic `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`EntityError`]: a resource or relationship member could not be found or created
//! - [`ValidationError`]: a payload failed structural validation
//! - [`StorageError`]: the backing store failed
//! - [`ConfigError`]: a resource or route was wired inconsistently (startup only)
//!
//! # HTTP mapping
//!
//! | Error | Status | Body |
//! |---|---|---|
//! | `EntityError::NotFound` | 404 | `{}` |
//! | `EntityError::RelationMemberNotFound` | 404 | `{"response": false}` |
//! | `ValidationError` | 400 | `{"errors": {"field": ["message"]}}` |
//! | everything else | 500 | `{"message": "...", "code": "500"}` |

use crate::core::field::{FieldErrors, MISSING_FIELD, SCHEMA_KEY, UNKNOWN_FIELD};
use crate::core::relation::Cardinality;
use crate::core::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use uuid::Uuid;

/// Message returned in place of internal error details
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// The main error type for restbase
#[derive(Debug)]
pub enum RestError {
    /// Entity-related errors (lookups, creation)
    Entity(EntityError),

    /// Payload validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal framework errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::Entity(e) => write!(f, "{}", e),
            RestError::Validation(e) => write!(f, "{}", e),
            RestError::Storage(e) => write!(f, "{}", e),
            RestError::Config(e) => write!(f, "{}", e),
            RestError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RestError::Entity(e) => Some(e),
            RestError::Validation(e) => Some(e),
            RestError::Storage(e) => Some(e),
            RestError::Config(e) => Some(e),
            RestError::Internal(_) => None,
        }
    }
}

/// Body of a generic 500 response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn internal() -> Self {
        Self {
            message: INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
            code: StatusCode::INTERNAL_SERVER_ERROR.as_u16().to_string(),
        }
    }
}

impl RestError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::Entity(e) => e.status_code(),
            RestError::Validation(_) => StatusCode::BAD_REQUEST,
            RestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RestError::Entity(e) => e.error_code(),
            RestError::Validation(_) => "VALIDATION_ERROR",
            RestError::Storage(_) => "STORAGE_ERROR",
            RestError::Config(_) => "CONFIG_ERROR",
            RestError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// JSON body returned at the HTTP boundary
    pub fn body(&self) -> serde_json::Value {
        match self {
            RestError::Entity(EntityError::NotFound { .. }) => json!({}),
            RestError::Entity(EntityError::RelationMemberNotFound { .. }) => {
                json!({ "response": false })
            }
            RestError::Validation(e) => json!({ "errors": e.field_errors() }),
            _ => json!(ErrorResponse::internal()),
        }
    }

    pub fn not_found(entity_type: impl Into<String>, id: Uuid) -> Self {
        RestError::Entity(EntityError::NotFound {
            entity_type: entity_type.into(),
            id,
        })
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyIdentified { entity_type, id } => {
                RestError::Entity(EntityError::AlreadyIdentified { entity_type, id })
            }
            StoreError::MissingIdentity { .. } => {
                ValidationError::FieldErrors(FieldErrors::single("id", MISSING_FIELD)).into()
            }
            StoreError::NotFound { entity_type, id } => RestError::not_found(entity_type, id),
            StoreError::UnknownField(field) => {
                ValidationError::FieldErrors(FieldErrors::single(field, UNKNOWN_FIELD)).into()
            }
            StoreError::InvalidField { field, message } => {
                ValidationError::FieldErrors(FieldErrors::single(field, message)).into()
            }
            StoreError::Persistence {
                entity_type,
                operation,
                message,
            } => RestError::Storage(StorageError::Persistence {
                entity_type,
                operation,
                message,
            }),
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::Internal(format!("serialization failed: {}", err))
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to resource lookups and creation
#[derive(Debug)]
pub enum EntityError {
    /// Resource (or the parent of a relationship) was not found
    NotFound { entity_type: String, id: Uuid },

    /// A relationship member could not be removed
    RelationMemberNotFound {
        entity_type: String,
        id: Uuid,
        relation: String,
        member_id: Uuid,
    },

    /// Create was called with a record that already carries an id
    AlreadyIdentified { entity_type: String, id: Uuid },

    /// The relationship key is not registered on this resource
    UnknownRelation { entity_type: String, relation: String },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::RelationMemberNotFound {
                entity_type,
                id,
                relation,
                member_id,
            } => {
                write!(
                    f,
                    "'{}' is not a member of {} on {} '{}'",
                    member_id, relation, entity_type, id
                )
            }
            EntityError::AlreadyIdentified { entity_type, id } => {
                write!(f, "{} already carries id '{}'", entity_type, id)
            }
            EntityError::UnknownRelation {
                entity_type,
                relation,
            } => {
                write!(f, "{} has no relationship '{}'", entity_type, relation)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::RelationMemberNotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyIdentified { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            EntityError::UnknownRelation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::RelationMemberNotFound { .. } => "RELATION_MEMBER_NOT_FOUND",
            EntityError::AlreadyIdentified { .. } => "ENTITY_ALREADY_IDENTIFIED",
            EntityError::UnknownRelation { .. } => "UNKNOWN_RELATION",
        }
    }
}

impl From<EntityError> for RestError {
    fn from(err: EntityError) -> Self {
        RestError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to payload validation
#[derive(Debug)]
pub enum ValidationError {
    /// Field-level structural errors
    FieldErrors(FieldErrors),

    /// The request body is not valid JSON
    InvalidJson { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => write!(f, "Validation failed: {}", errors),
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Field-keyed messages, with body-level problems under `_schema`
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            ValidationError::FieldErrors(errors) => errors.clone(),
            ValidationError::InvalidJson { message } => {
                FieldErrors::single(SCHEMA_KEY, message.clone())
            }
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::Validation(err)
    }
}

impl From<FieldErrors> for ValidationError {
    fn from(errors: FieldErrors) -> Self {
        ValidationError::FieldErrors(errors)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the backing store
#[derive(Debug)]
pub enum StorageError {
    /// A store operation failed and was rolled back
    Persistence {
        entity_type: String,
        operation: String,
        message: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Persistence {
                entity_type,
                operation,
                message,
            } => write!(f, "Failed to {} {}: {}", operation, entity_type, message),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        RestError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors raised while wiring resources and routes, or loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// A relationship endpoint kind was derived without a relationship
    MissingRelationship { endpoint: String, resource: String },

    /// The key is not a declared relationship of the resource
    UnknownRelation { resource: String, key: String },

    /// The registered cardinality disagrees with the declared one
    CardinalityMismatch {
        resource: String,
        key: String,
        declared: Cardinality,
        requested: Cardinality,
    },

    /// Two routes derived the same view name
    DuplicateView { name: String },

    /// The same relationship key was registered twice
    DuplicateRelation { resource: String, key: String },

    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRelationship { endpoint, resource } => {
                write!(
                    f,
                    "{} route for '{}' requires a relationship",
                    endpoint, resource
                )
            }
            ConfigError::UnknownRelation { resource, key } => {
                write!(f, "'{}' declares no relationship '{}'", resource, key)
            }
            ConfigError::CardinalityMismatch {
                resource,
                key,
                declared,
                requested,
            } => {
                write!(
                    f,
                    "relationship '{}.{}' is declared {} but registered as {}",
                    resource, key, declared, requested
                )
            }
            ConfigError::DuplicateView { name } => {
                write!(f, "view '{}' is already registered", name)
            }
            ConfigError::DuplicateRelation { resource, key } => {
                write!(f, "relationship '{}.{}' is already registered", resource, key)
            }
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for RestError {
    fn from(err: ConfigError) -> Self {
        RestError::Config(err)
    }
}

/// Result type alias for restbase operations
pub type RestResult<T> = Result<T, RestError>;
