//! Resource registry for managing resource descriptors and auto-generating routes

use axum::Router;
use axum::routing::get;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::entity::Resource;
use crate::core::error::ConfigError;
use crate::core::query::PaginationConfig;
use crate::core::serializer::Envelope;
use crate::core::service::ResourceService;
use crate::resources::deriver::{EndpointKind, view_name, view_uri};
use crate::resources::handlers::{
    RelationState, ResourceState, create_resource, delete_relationship_member, delete_resource,
    get_relationship, get_relationship_member, get_resource, list_resources,
    replace_relationship, update_resource,
};
use crate::resources::registry::{RouteInfo, RouteTable};

/// Trait that describes how to build routes for a resource
pub trait ResourceDescriptor: Send + Sync {
    /// Plural label (e.g., "parents")
    fn resource_name(&self) -> &str;

    /// Relationship keys, ordered
    fn relation_keys(&self) -> Vec<String>;

    /// Build the resource's routes, recording each one in `table`
    ///
    /// Produces the collection and by-id routes, plus one relationship
    /// collection and one relationship member route per registered relationship.
    fn build_routes(
        &self,
        table: &mut RouteTable,
        pagination: &PaginationConfig,
    ) -> Result<Router, ConfigError>;
}

/// Descriptor backed by a `ResourceService`
pub struct ResourceRegistration<T: Resource> {
    service: Arc<ResourceService<T>>,
}

impl<T: Resource> ResourceRegistration<T> {
    pub fn new(service: ResourceService<T>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<ResourceService<T>> {
        &self.service
    }
}

fn record(
    table: &mut RouteTable,
    kind: EndpointKind,
    resource: Envelope,
    relation: Option<(&str, Envelope)>,
) -> Result<String, ConfigError> {
    let sub = relation.map(|(_, envelope)| envelope);
    let uri = view_uri(kind, resource, sub)?;
    table.register(RouteInfo {
        view_name: view_name(kind, resource, sub)?,
        uri: uri.clone(),
        kind,
        resource: resource.plural.to_string(),
        relation: relation.map(|(key, _)| key.to_string()),
    })?;
    Ok(uri)
}

impl<T: Resource> ResourceDescriptor for ResourceRegistration<T> {
    fn resource_name(&self) -> &str {
        T::resource_name()
    }

    fn relation_keys(&self) -> Vec<String> {
        self.service
            .relations()
            .iter()
            .map(|relation| relation.key().to_string())
            .collect()
    }

    fn build_routes(
        &self,
        table: &mut RouteTable,
        pagination: &PaginationConfig,
    ) -> Result<Router, ConfigError> {
        let envelope = self.service.envelope();
        let state = ResourceState {
            service: self.service.clone(),
            pagination: pagination.clone(),
        };

        let collection_uri = record(table, EndpointKind::Collection, envelope, None)?;
        let by_id_uri = record(table, EndpointKind::ById, envelope, None)?;

        let mut router = Router::new()
            .route(
                &collection_uri,
                get(list_resources::<T>)
                    .post(create_resource::<T>)
                    .put(update_resource::<T>),
            )
            .route(
                &by_id_uri,
                get(get_resource::<T>).delete(delete_resource::<T>),
            )
            .with_state(state);

        for relation in self.service.relations() {
            let sub = Some((relation.key(), relation.sub_envelope()));
            let collection_uri = record(table, EndpointKind::RelationshipCollection, envelope, sub)?;
            let member_uri = record(table, EndpointKind::RelationshipMember, envelope, sub)?;

            let state = RelationState {
                service: self.service.clone(),
                key: Arc::from(relation.key()),
            };

            router = router.merge(
                Router::new()
                    .route(
                        &collection_uri,
                        get(get_relationship::<T>).put(replace_relationship::<T>),
                    )
                    .route(
                        &member_uri,
                        get(get_relationship_member::<T>).delete(delete_relationship_member::<T>),
                    )
                    .with_state(state),
            );
        }

        tracing::debug!(
            resource = T::resource_name(),
            relations = self.service.relations().len(),
            "resource routes built"
        );
        Ok(router)
    }
}

/// Registry for all resources in the application
#[derive(Default)]
pub struct ResourceRegistry {
    descriptors: BTreeMap<String, Box<dyn ResourceDescriptor>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource descriptor under its plural label
    pub fn register(&mut self, descriptor: Box<dyn ResourceDescriptor>) -> Result<(), ConfigError> {
        let name = descriptor.resource_name().to_string();
        if self.descriptors.contains_key(&name) {
            return Err(ConfigError::DuplicateView { name });
        }
        self.descriptors.insert(name, descriptor);
        Ok(())
    }

    /// Build a router with every registered resource's routes
    pub fn build_routes(
        &self,
        pagination: &PaginationConfig,
    ) -> Result<(Router, RouteTable), ConfigError> {
        let mut router = Router::new();
        let mut table = RouteTable::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes(&mut table, pagination)?);
        }

        Ok((router, table))
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
