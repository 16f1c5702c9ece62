//! # restbase
//!
//! A generic REST resource framework for Rust: declare a resource and its
//! relationships, get CRUD and relationship endpoints.
//!
//! ## Features
//!
//! - **Declarative resources**: `impl_resource!` generates the struct, its
//!   base fields and its field and relationship tables
//! - **Soft delete**: deleted resources are deactivated, never removed
//! - **Automatic timestamps**: `created` and `updated` managed by the store
//! - **Relationships**: `many` and `single` references to other resources,
//!   readable and replaceable through nested routes
//! - **Derived routes**: URL templates and stable view names computed from
//!   the resource labels, with reverse routing
//! - **Enveloped payloads**: `{"parent": {...}}` / `{"parents": [...]}`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restbase::prelude::*;
//!
//! impl_resource!(Child, singular: "child", fields: { name: String });
//! impl_resource!(
//!     Parent,
//!     singular: "parent",
//!     fields: { name: String },
//!     relations: { children: many }
//! );
//!
//! let children: Arc<dyn ResourceStore<Child>> = Arc::new(InMemoryStore::new());
//! let parents = ResourceService::new(Arc::new(InMemoryStore::<Parent>::new()))
//!     .with_relation(RelationDescriptor::many("children", children.clone())?)?;
//!
//! ServerBuilder::new()
//!     .register(parents)?
//!     .register(ResourceService::new(children))?
//!     .serve()
//!     .await?;
//! ```
//!
//! This serves `/parents`, `/parents/{id}`, `/parents/{id}/children`,
//! `/parents/{id}/children/{sub_id}`, `/children` and `/children/{id}`.

pub mod config;
pub mod core;
pub mod entities;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        context::RequestContext,
        entity::{Entity, EntityMeta, Resource},
        pluralize::Pluralizer,
        query::{Page, PaginationConfig},
        relation::{Cardinality, RelationDescriptor, RelationValue},
        serializer::{Envelope, ResourceSerializer},
        service::ResourceService,
        store::{ResourceStore, StoreError},
    };

    // === Errors ===
    pub use crate::core::error::{ConfigError, RestError, RestResult, ValidationError};
    pub use crate::core::field::FieldErrors;

    // === Macros ===
    pub use crate::impl_resource;

    // === Routing ===
    pub use crate::resources::{EndpointKind, RouteInfo, RouteTable, view_name, view_uri};

    // === Storage ===
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{AppConfig, Environment, LoggingConfig, init_tracing};

    // === Server ===
    pub use crate::server::{ApiCallRecord, ApiLogSink, InMemoryApiLog, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{Router, routing::get};
}
