//! Axum extractors for resource routes
//!
//! Identity path segments must be UUIDs. A segment that does not parse is
//! treated as a route that does not exist: `404 {}`, never a 400.

use axum::Json;
use axum::extract::{FromRequestParts, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::core::context::RequestContext;

/// Errors that can occur during extraction
#[derive(Debug, Clone)]
pub enum ExtractorError {
    InvalidPath,
    InvalidResourceId(String),
}

impl std::fmt::Display for ExtractorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractorError::InvalidPath => write!(f, "Invalid path format"),
            ExtractorError::InvalidResourceId(raw) => write!(f, "Invalid resource id: {}", raw),
        }
    }
}

impl std::error::Error for ExtractorError {}

impl IntoResponse for ExtractorError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "path did not match a resource");
        (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response()
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ExtractorError> {
    Uuid::parse_str(raw).map_err(|_| ExtractorError::InvalidResourceId(raw.to_string()))
}

/// `{id}` path parameter of by-id and relationship-collection routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub Uuid);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ExtractorError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ExtractorError::InvalidPath)?;
        Ok(ResourceId(parse_id(&raw)?))
    }
}

/// `{id}` and `{sub_id}` path parameters of relationship-member routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberPath {
    pub id: Uuid,
    pub sub_id: Uuid,
}

impl<S> FromRequestParts<S> for MemberPath
where
    S: Send + Sync,
{
    type Rejection = ExtractorError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((id, sub_id)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|_| ExtractorError::InvalidPath)?;
        Ok(MemberPath {
            id: parse_id(&id)?,
            sub_id: parse_id(&sub_id)?,
        })
    }
}

/// Uses the context inserted by the API-call middleware, or opens a fresh
/// one when the router runs without it
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext::new(parts.method.as_str(), parts.uri.path())))
    }
}
