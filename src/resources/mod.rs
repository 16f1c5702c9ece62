//! Route derivation, reverse routing and generic HTTP handlers for resources

pub mod deriver;
pub mod handlers;
pub mod registry;

pub use deriver::{EndpointKind, view_name, view_uri};
pub use handlers::{RelationState, ResourceState};
pub use registry::{RouteInfo, RouteTable};
