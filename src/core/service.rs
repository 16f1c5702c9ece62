//! Business logic between the HTTP handlers and the resource store
//!
//! A `ResourceService` is built once at startup: the store handle, the
//! serializer and the relationship table never change afterwards. Every
//! operation receives the request context explicitly and runs inside a
//! `tracing` span carrying the request id.

use crate::core::context::RequestContext;
use crate::core::entity::Resource;
use crate::core::error::{ConfigError, EntityError, RestError, RestResult};
use crate::core::query::Page;
use crate::core::relation::{Cardinality, RelationDescriptor, RelationValue};
use crate::core::serializer::{Envelope, ResourceSerializer};
use crate::core::store::ResourceStore;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Service for one resource type and its relationships
pub struct ResourceService<T: Resource> {
    store: Arc<dyn ResourceStore<T>>,
    serializer: ResourceSerializer<T>,
    relations: HashMap<String, RelationDescriptor<T>>,
}

impl<T: Resource> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            serializer: self.serializer.clone(),
            relations: self.relations.clone(),
        }
    }
}

impl<T: Resource> ResourceService<T> {
    pub fn new(store: Arc<dyn ResourceStore<T>>) -> Self {
        Self {
            store,
            serializer: ResourceSerializer::new(),
            relations: HashMap::new(),
        }
    }

    /// Register a relationship; each key may be registered once
    pub fn with_relation(mut self, descriptor: RelationDescriptor<T>) -> Result<Self, ConfigError> {
        let key = descriptor.key().to_string();
        if self.relations.contains_key(&key) {
            return Err(ConfigError::DuplicateRelation {
                resource: T::resource_name().to_string(),
                key,
            });
        }
        self.relations.insert(key, descriptor);
        Ok(self)
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore<T>> {
        &self.store
    }

    pub fn serializer(&self) -> &ResourceSerializer<T> {
        &self.serializer
    }

    pub fn envelope(&self) -> Envelope {
        self.serializer.envelope()
    }

    /// Registered relationships, ordered by key
    pub fn relations(&self) -> Vec<&RelationDescriptor<T>> {
        let mut relations: Vec<_> = self.relations.values().collect();
        relations.sort_by(|a, b| a.key().cmp(b.key()));
        relations
    }

    pub fn relation(&self, key: &str) -> RestResult<&RelationDescriptor<T>> {
        self.relations.get(key).ok_or_else(|| {
            RestError::Entity(EntityError::UnknownRelation {
                entity_type: T::resource_name().to_string(),
                relation: key.to_string(),
            })
        })
    }

    // === Primary resource ===

    /// `{"<singular>": {...}}`, or not found
    #[tracing::instrument(name = "get_by_id", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), %id))]
    pub async fn get_by_id(&self, ctx: &RequestContext, id: Uuid) -> RestResult<Value> {
        let resource = self.fetch(id).await?;
        Ok(self.serializer.dump_one(&resource)?)
    }

    /// `{"<plural>": [...]}` for one page of active resources
    #[tracing::instrument(name = "list", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), page = page.page, limit = page.limit))]
    pub async fn list(&self, ctx: &RequestContext, page: Page) -> RestResult<Value> {
        let resources = self.store.list(page).await?;
        tracing::debug!(count = resources.len(), "listed");
        Ok(self.serializer.dump_many(&resources)?)
    }

    /// Create from an enveloped payload; server-controlled fields are ignored
    #[tracing::instrument(name = "create", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name()))]
    pub async fn create(&self, ctx: &RequestContext, payload: Value) -> RestResult<Value> {
        let mut resource = self.serializer.load_create(payload)?;
        self.prune_relations(&mut resource).await?;

        let created = self.store.create(resource).await?;
        tracing::info!(id = ?created.id(), "created");
        Ok(self.serializer.dump_one(&created)?)
    }

    /// Whole-object replace from an enveloped payload naming its `id`
    #[tracing::instrument(name = "update", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name()))]
    pub async fn update(&self, ctx: &RequestContext, payload: Value) -> RestResult<Value> {
        let mut resource = self.serializer.load_update(payload)?;
        self.prune_relations(&mut resource).await?;

        let replaced = self.store.replace(resource).await?;
        tracing::info!(id = ?replaced.id(), "replaced");
        Ok(self.serializer.dump_one(&replaced)?)
    }

    /// Soft-delete; `{"result": bool}`
    #[tracing::instrument(name = "delete", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), %id))]
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> RestResult<Value> {
        let deleted = self.store.delete(&id).await?;
        tracing::info!(deleted, "delete requested");
        Ok(json!({ "result": deleted }))
    }

    // === Relationships ===

    /// Current relationship value: `{"<sub plural>": [...]}` or `{"<sub singular>": {...}}`
    #[tracing::instrument(name = "get_sub_resource", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), %id, relation = key))]
    pub async fn get_sub_resource(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        key: &str,
    ) -> RestResult<Value> {
        let relation = self.relation(key)?;
        let parent = self.fetch(id).await?;
        let resolved = relation.resolve_all(&relation.get(&parent).ids()).await?;
        Ok(render(relation, resolved))
    }

    /// Replace the relationship with the references in `payload`
    ///
    /// References that do not resolve to an active sub-resource are dropped.
    #[tracing::instrument(name = "replace_sub_resource", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), %id, relation = key))]
    pub async fn replace_sub_resource(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: Value,
        key: &str,
    ) -> RestResult<Value> {
        let relation = self.relation(key)?;
        let mut parent = self.fetch(id).await?;

        let requested = relation
            .sub_envelope()
            .load_references(payload, relation.cardinality())?;
        let requested_ids = requested.ids();
        let resolved = relation.resolve_all(&requested_ids).await?;
        if resolved.len() < requested_ids.len() {
            tracing::debug!(
                requested = requested_ids.len(),
                resolved = resolved.len(),
                "dropped unresolvable references"
            );
        }

        let ids = resolved.iter().map(|(id, _)| *id).collect();
        relation.set(&mut parent, RelationValue::from_ids(relation.cardinality(), ids));
        self.store.replace(parent).await?;

        Ok(render(relation, resolved))
    }

    /// One member of the relationship: `{"<sub singular>": {...}}`, or not found
    #[tracing::instrument(name = "get_sub_resource_by_id", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), %id, relation = key, %sub_id))]
    pub async fn get_sub_resource_by_id(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        sub_id: Uuid,
        key: &str,
    ) -> RestResult<Value> {
        let relation = self.relation(key)?;
        let parent = self.fetch(id).await?;
        let envelope = relation.sub_envelope();

        if !relation.get(&parent).contains(&sub_id) {
            return Err(RestError::not_found(envelope.singular, sub_id));
        }

        match relation.resolve(&sub_id).await? {
            Some(value) => Ok(envelope.wrap_one(value)),
            None => Err(RestError::not_found(envelope.singular, sub_id)),
        }
    }

    /// Remove one member from the relationship; `{"response": true}`
    #[tracing::instrument(name = "delete_sub_resource_by_id", skip_all, fields(request_id = %ctx.request_id, resource = T::resource_name(), %id, relation = key, %sub_id))]
    pub async fn delete_sub_resource_by_id(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        sub_id: Uuid,
        key: &str,
    ) -> RestResult<Value> {
        let relation = self.relation(key)?;
        let member_not_found = || {
            RestError::Entity(EntityError::RelationMemberNotFound {
                entity_type: T::resource_name_singular().to_string(),
                id,
                relation: key.to_string(),
                member_id: sub_id,
            })
        };

        let Some(mut parent) = self.store.get(&id).await? else {
            return Err(member_not_found());
        };

        let mut value = relation.get(&parent);
        if !value.remove(&sub_id) {
            return Err(member_not_found());
        }

        relation.set(&mut parent, value);
        self.store.replace(parent).await?;
        tracing::info!("relationship member removed");
        Ok(json!({ "response": true }))
    }

    // === Helpers ===

    async fn fetch(&self, id: Uuid) -> RestResult<T> {
        self.store
            .get(&id)
            .await?
            .ok_or_else(|| RestError::not_found(T::resource_name_singular(), id))
    }

    /// Keep only references that resolve to active sub-resources
    async fn prune_relations(&self, resource: &mut T) -> RestResult<()> {
        for relation in self.relations.values() {
            let current = relation.get(resource);
            let resolved = relation.resolve_all(&current.ids()).await?;
            let ids = resolved.into_iter().map(|(id, _)| id).collect();
            relation.set(resource, RelationValue::from_ids(relation.cardinality(), ids));
        }
        Ok(())
    }
}

/// Wrap resolved sub-resources in the sub-resource's envelope
fn render<T: Resource>(relation: &RelationDescriptor<T>, resolved: Vec<(Uuid, Value)>) -> Value {
    let envelope = relation.sub_envelope();
    let mut values = resolved.into_iter().map(|(_, value)| value);
    match relation.cardinality() {
        Cardinality::Many => envelope.wrap_many(values.collect()),
        Cardinality::Single => envelope.wrap_one(values.next().unwrap_or(Value::Null)),
    }
}
