//! Per-request API-call logging and the top-level panic handler
//!
//! `track_api_call` runs around every route: it opens the request's
//! [`RequestContext`], lets the request through, then emits one
//! [`ApiCallRecord`] to `tracing` (target `restbase::api`) and, when one is
//! configured, to an [`ApiLogSink`].

use async_trait::async_trait;
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::context::RequestContext;
use crate::core::error::ErrorResponse;

/// One served request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCallRecord {
    pub request_id: Uuid,
    pub url: String,
    pub method: String,
    pub status_code: u16,
    pub request_time: DateTime<Utc>,
    pub response_time: DateTime<Utc>,
    pub remote_address: Option<String>,
}

/// Destination for API-call records
#[async_trait]
pub trait ApiLogSink: Send + Sync {
    async fn record(&self, call: ApiCallRecord);
}

/// Records kept by [`InMemoryApiLog::new`]
pub const DEFAULT_API_LOG_CAPACITY: usize = 1024;

/// Keeps the most recent records in memory, oldest first
///
/// Once `capacity` records are held, each new record evicts the oldest.
#[derive(Debug, Clone)]
pub struct InMemoryApiLog {
    records: Arc<Mutex<VecDeque<ApiCallRecord>>>,
    capacity: usize,
}

impl Default for InMemoryApiLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_API_LOG_CAPACITY)
    }
}

impl InMemoryApiLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` records (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the records so far
    pub fn records(&self) -> Vec<ApiCallRecord> {
        match self.records.lock() {
            Ok(records) => records.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn push(&self, call: ApiCallRecord) {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(call);
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ApiLogSink for InMemoryApiLog {
    async fn record(&self, call: ApiCallRecord) {
        self.push(call);
    }
}

/// Middleware state: whether records are emitted and where they go
#[derive(Clone, Default)]
pub struct ApiLog {
    enabled: bool,
    sink: Option<Arc<dyn ApiLogSink>>,
}

impl ApiLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ApiLogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Peer address from the connection, else the first `X-Forwarded-For` hop
fn remote_address(request: &Request) -> Option<String> {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.ip().to_string());
    }
    forwarded_for(request.headers())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
}

/// Insert the request context, run the request, then log the call
pub async fn track_api_call(State(log): State<ApiLog>, mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::new(request.method().as_str(), request.uri().path());
    request.extensions_mut().insert(ctx.clone());

    let url = request.uri().to_string();
    let remote_address = remote_address(&request);

    let response = next.run(request).await;

    if !log.enabled {
        return response;
    }

    let call = ApiCallRecord {
        request_id: ctx.request_id,
        url,
        method: ctx.method,
        status_code: response.status().as_u16(),
        request_time: ctx.received_at,
        response_time: Utc::now(),
        remote_address,
    };

    tracing::info!(
        target: "restbase::api",
        request_id = %call.request_id,
        method = %call.method,
        url = %call.url,
        status = call.status_code,
        elapsed_ms = (call.response_time - call.request_time).num_milliseconds(),
        remote = call.remote_address.as_deref().unwrap_or("-"),
        "api call"
    );

    if let Some(sink) = &log.sink {
        sink.record(call).await;
    }

    response
}

/// Response for panics caught by `CatchPanicLayer`
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal()),
    )
        .into_response()
}
