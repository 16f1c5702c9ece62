//! Route table for reverse routing
//!
//! Every route registered by the server is recorded here under its derived
//! view name, so links can be generated from a view name and its ids.

use crate::core::error::ConfigError;
use crate::resources::deriver::EndpointKind;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Information about one registered route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// Derived view name (e.g., "parentschildrenByModelId")
    pub view_name: String,

    /// URL template (e.g., "/parents/{id}/children")
    pub uri: String,

    pub kind: EndpointKind,

    /// Plural label of the resource owning the route
    pub resource: String,

    /// Relationship key for relationship routes
    pub relation: Option<String>,
}

impl RouteInfo {
    pub fn methods(&self) -> &'static [&'static str] {
        self.kind.methods()
    }
}

/// Registry of view names to URL templates
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteInfo>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a route; a view name may be registered once
    pub fn register(&mut self, route: RouteInfo) -> Result<(), ConfigError> {
        if self.routes.contains_key(&route.view_name) {
            return Err(ConfigError::DuplicateView {
                name: route.view_name,
            });
        }
        tracing::debug!(view = %route.view_name, uri = %route.uri, "route registered");
        self.routes.insert(route.view_name.clone(), route);
        Ok(())
    }

    /// Fold another table into this one
    pub fn merge(&mut self, other: RouteTable) -> Result<(), ConfigError> {
        for route in other.routes.into_values() {
            self.register(route)?;
        }
        Ok(())
    }

    pub fn get(&self, view_name: &str) -> Option<&RouteInfo> {
        self.routes.get(view_name)
    }

    /// Routes ordered by view name
    pub fn routes(&self) -> impl Iterator<Item = &RouteInfo> {
        self.routes.values()
    }

    /// Routes owned by one resource
    pub fn routes_for(&self, resource: &str) -> Vec<&RouteInfo> {
        self.routes
            .values()
            .filter(|route| route.resource == resource)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Build a concrete URL for a view
    ///
    /// Returns `None` if the view is unknown or a parameter of its template
    /// is not supplied.
    ///
    /// ```rust,ignore
    /// let url = table.url_for("parentsById", &[("id", parent_id)]);
    /// ```
    pub fn url_for(&self, view_name: &str, params: &[(&str, Uuid)]) -> Option<String> {
        let route = self.routes.get(view_name)?;
        let mut url = route.uri.clone();
        for (name, value) in params {
            url = url.replace(&format!("{{{}}}", name), &value.to_string());
        }
        if url.contains('{') {
            return None;
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(view_name: &str, uri: &str, kind: EndpointKind) -> RouteInfo {
        RouteInfo {
            view_name: view_name.to_string(),
            uri: uri.to_string(),
            kind,
            resource: "parents".to_string(),
            relation: None,
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut table = RouteTable::new();
        table
            .register(route("parentsById", "/parents/{id}", EndpointKind::ById))
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("parentsById").unwrap().methods(), &["GET", "DELETE"]);
    }

    #[test]
    fn test_duplicate_view_is_rejected() {
        let mut table = RouteTable::new();
        table
            .register(route("parents", "/parents", EndpointKind::Collection))
            .unwrap();
        let err = table
            .register(route("parents", "/parents", EndpointKind::Collection))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateView { name } if name == "parents"));
    }

    #[test]
    fn test_url_for() {
        let mut table = RouteTable::new();
        table
            .register(route(
                "parentschildrenByModelIdBySubResourceId",
                "/parents/{id}/children/{sub_id}",
                EndpointKind::RelationshipMember,
            ))
            .unwrap();

        let id = Uuid::new_v4();
        let sub_id = Uuid::new_v4();
        assert_eq!(
            table.url_for(
                "parentschildrenByModelIdBySubResourceId",
                &[("id", id), ("sub_id", sub_id)]
            ),
            Some(format!("/parents/{}/children/{}", id, sub_id))
        );
        assert_eq!(
            table.url_for("parentschildrenByModelIdBySubResourceId", &[("id", id)]),
            None
        );
        assert_eq!(table.url_for("unknown", &[]), None);
    }

    #[test]
    fn test_merge_detects_duplicates() {
        let mut a = RouteTable::new();
        a.register(route("parents", "/parents", EndpointKind::Collection))
            .unwrap();
        let mut b = RouteTable::new();
        b.register(route("parents", "/parents", EndpointKind::Collection))
            .unwrap();

        assert!(a.merge(b).is_err());
    }
}
