//! Core module containing fundamental traits and types for the framework

pub mod context;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod pluralize;
pub mod query;
pub mod relation;
pub mod serializer;
pub mod service;
pub mod store;

pub use context::RequestContext;
pub use entity::{Entity, EntityMeta, Resource};
pub use error::{ConfigError, EntityError, RestError, RestResult, ValidationError};
pub use field::{FieldError, FieldErrors};
pub use pluralize::Pluralizer;
pub use query::{Page, PaginationConfig};
pub use relation::{Cardinality, RelationDescriptor, RelationValue};
pub use serializer::{Envelope, ResourceSerializer};
pub use service::ResourceService;
pub use store::{ResourceStore, StoreError};
