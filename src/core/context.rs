//! Request-scoped context threaded explicitly through service calls

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Identity and timing of the request a service call serves
///
/// Inserted into request extensions by the API-call logging middleware and
/// passed by reference into every `ResourceService` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub method: String,
    pub path: String,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            received_at: Utc::now(),
            method: method.into(),
            path: path.into(),
        }
    }

    /// Context for calls made outside an HTTP request (startup, jobs, tests)
    pub fn detached() -> Self {
        Self::new("INTERNAL", "-")
    }
}
