//! Generic HTTP handlers for resources and their relationships
//!
//! These handlers know nothing about concrete resource types: they extract
//! path ids, query and body, then delegate to the `ResourceService` held in
//! their state. Every success is `200` with an enveloped JSON body.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::core::entity::Resource;
use crate::core::error::{RestResult, ValidationError};
use crate::core::extractors::{MemberPath, ResourceId};
use crate::core::query::PaginationConfig;
use crate::core::service::ResourceService;

/// State shared by the collection and by-id handlers of one resource
pub struct ResourceState<T: Resource> {
    pub service: Arc<ResourceService<T>>,
    pub pagination: PaginationConfig,
}

impl<T: Resource> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            pagination: self.pagination.clone(),
        }
    }
}

/// State of the relationship handlers for one relationship key
pub struct RelationState<T: Resource> {
    pub service: Arc<ResourceService<T>>,
    pub key: Arc<str>,
}

impl<T: Resource> Clone for RelationState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            key: self.key.clone(),
        }
    }
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ValidationError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "request body rejected");
        ValidationError::InvalidJson {
            message: rejection.body_text(),
        }
    })
}

// === Collection: /xs ===

/// `GET /xs?page=&limit=`
///
/// Malformed query strings fall back to the configured defaults.
pub async fn list_resources<T: Resource>(
    State(state): State<ResourceState<T>>,
    ctx: RequestContext,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> RestResult<Json<Value>> {
    let params = query.map(|Query(params)| params).unwrap_or_default();
    let page = state.pagination.page_from_query(&params);
    Ok(Json(state.service.list(&ctx, page).await?))
}

/// `POST /xs`
pub async fn create_resource<T: Resource>(
    State(state): State<ResourceState<T>>,
    ctx: RequestContext,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Json<Value>> {
    let payload = json_body(body)?;
    Ok(Json(state.service.create(&ctx, payload).await?))
}

/// `PUT /xs`
pub async fn update_resource<T: Resource>(
    State(state): State<ResourceState<T>>,
    ctx: RequestContext,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Json<Value>> {
    let payload = json_body(body)?;
    Ok(Json(state.service.update(&ctx, payload).await?))
}

// === By id: /xs/{id} ===

pub async fn get_resource<T: Resource>(
    State(state): State<ResourceState<T>>,
    ctx: RequestContext,
    ResourceId(id): ResourceId,
) -> RestResult<Json<Value>> {
    Ok(Json(state.service.get_by_id(&ctx, id).await?))
}

pub async fn delete_resource<T: Resource>(
    State(state): State<ResourceState<T>>,
    ctx: RequestContext,
    ResourceId(id): ResourceId,
) -> RestResult<Json<Value>> {
    Ok(Json(state.service.delete(&ctx, id).await?))
}

// === Relationship collection: /xs/{id}/ys ===

pub async fn get_relationship<T: Resource>(
    State(state): State<RelationState<T>>,
    ctx: RequestContext,
    ResourceId(id): ResourceId,
) -> RestResult<Json<Value>> {
    Ok(Json(
        state.service.get_sub_resource(&ctx, id, &state.key).await?,
    ))
}

/// `PUT /xs/{id}/ys` with `{"ys": [{"id": ...}]}` or `{"y": {"id": ...}}`
pub async fn replace_relationship<T: Resource>(
    State(state): State<RelationState<T>>,
    ctx: RequestContext,
    ResourceId(id): ResourceId,
    body: Result<Json<Value>, JsonRejection>,
) -> RestResult<Json<Value>> {
    let payload = json_body(body)?;
    Ok(Json(
        state
            .service
            .replace_sub_resource(&ctx, id, payload, &state.key)
            .await?,
    ))
}

// === Relationship member: /xs/{id}/ys/{sub_id} ===

pub async fn get_relationship_member<T: Resource>(
    State(state): State<RelationState<T>>,
    ctx: RequestContext,
    MemberPath { id, sub_id }: MemberPath,
) -> RestResult<Json<Value>> {
    Ok(Json(
        state
            .service
            .get_sub_resource_by_id(&ctx, id, sub_id, &state.key)
            .await?,
    ))
}

pub async fn delete_relationship_member<T: Resource>(
    State(state): State<RelationState<T>>,
    ctx: RequestContext,
    MemberPath { id, sub_id }: MemberPath,
) -> RestResult<Json<Value>> {
    Ok(Json(
        state
            .service
            .delete_sub_resource_by_id(&ctx, id, sub_id, &state.key)
            .await?,
    ))
}
