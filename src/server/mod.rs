//! Server module for building HTTP servers with auto-registered routes
//!
//! `ServerBuilder` registers, for every resource:
//! - collection and by-id routes
//! - relationship collection and member routes for each relationship
//!
//! and wraps them with API-call logging, panic catching and HTTP tracing.

pub mod api_log;
pub mod builder;
pub mod exposure;
pub mod resource_registry;

pub use api_log::{ApiCallRecord, ApiLog, ApiLogSink, DEFAULT_API_LOG_CAPACITY, InMemoryApiLog};
pub use builder::ServerBuilder;
pub use resource_registry::{ResourceDescriptor, ResourceRegistration, ResourceRegistry};
