//! REST API exposure for the framework
//!
//! Turns the registered resources into an Axum `Router`: health checks,
//! the derived resource routes, custom routes, then the cross-cutting
//! layers (panic catching, API-call logging, HTTP tracing).

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::core::error::ConfigError;
use crate::core::query::PaginationConfig;
use crate::resources::registry::RouteTable;
use crate::server::api_log::{ApiLog, handle_panic, track_api_call};
use crate::server::resource_registry::ResourceRegistry;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router and the table of every derived route
    ///
    /// Fails if two routes derive the same view name.
    pub fn build_router(
        registry: &ResourceRegistry,
        pagination: &PaginationConfig,
        api_log: ApiLog,
        custom_routes: Vec<Router>,
    ) -> Result<(Router, RouteTable), ConfigError> {
        let (resource_routes, table) = registry.build_routes(pagination)?;

        let mut app = Self::health_routes().merge(resource_routes);
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        let app = app
            .fallback(Self::not_found)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn_with_state(api_log, track_api_call))
            .layer(TraceLayer::new_for_http());

        tracing::info!(
            resources = registry.len(),
            routes = table.len(),
            "REST router built"
        );
        Ok((app, table))
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "restbase"
        }))
    }

    async fn not_found() -> impl IntoResponse {
        (StatusCode::NOT_FOUND, Json(json!({})))
    }
}
