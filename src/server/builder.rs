//! ServerBuilder for fluent API to build HTTP servers

use super::api_log::{ApiLog, ApiLogSink};
use super::exposure::RestExposure;
use super::resource_registry::{ResourceRegistration, ResourceRegistry};
use crate::config::AppConfig;
use crate::core::entity::Resource;
use crate::core::error::ConfigError;
use crate::core::service::ResourceService;
use crate::resources::registry::RouteTable;
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with auto-registered resource routes
///
/// # Example
///
/// ```ignore
/// let children: Arc<dyn ResourceStore<Child>> = Arc::new(InMemoryStore::new());
/// let parents = ResourceService::new(Arc::new(InMemoryStore::<Parent>::new()))
///     .with_relation(RelationDescriptor::many("children", children.clone())?)?;
///
/// let app = ServerBuilder::new()
///     .register(parents)?
///     .register(ResourceService::new(children))?
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    registry: ResourceRegistry,
    api_log_sink: Option<Arc<dyn ApiLogSink>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            registry: ResourceRegistry::new(),
            api_log_sink: None,
            custom_routes: Vec::new(),
        }
    }

    /// Use `config` for pagination, logging and the bind address
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Send API-call records to `sink` in addition to `tracing`
    pub fn with_api_log(mut self, sink: impl ApiLogSink + 'static) -> Self {
        self.api_log_sink = Some(Arc::new(sink));
        self
    }

    /// Add routes that don't fit the resource pattern
    ///
    /// Custom routes get the same layers (API-call logging, panic catching,
    /// tracing) as resource routes.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a resource and its relationships
    ///
    /// Fails if a resource with the same plural label is already registered.
    pub fn register<T: Resource>(mut self, service: ResourceService<T>) -> Result<Self, ConfigError> {
        self.registry
            .register(Box::new(ResourceRegistration::new(service)))?;
        tracing::debug!(resource = T::resource_name(), "resource registered");
        Ok(self)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn api_log(&self) -> ApiLog {
        let log = ApiLog::new(self.config.logging.api_log);
        match &self.api_log_sink {
            Some(sink) => log.with_sink(sink.clone()),
            None => log,
        }
    }

    /// Build the router together with its route table
    pub fn build_with_routes(mut self) -> Result<(Router, RouteTable), ConfigError> {
        let api_log = self.api_log();
        let custom_routes = std::mem::take(&mut self.custom_routes);
        RestExposure::build_router(
            &self.registry,
            &self.config.pagination,
            api_log,
            custom_routes,
        )
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router, ConfigError> {
        self.build_with_routes().map(|(router, _)| router)
    }

    /// Serve on the configured bind address with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address.clone();
        self.serve_on(&addr).await
    }

    /// Serve on `addr` with graceful shutdown
    pub async fn serve_on(self, addr: &str) -> Result<()> {
        let environment = self.config.environment;
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(?environment, "Server listening on {}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
