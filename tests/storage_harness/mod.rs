//! Shared test harness for resource store and HTTP testing
//!
//! Provides the test resources `Parent` (with `children`), `Child` (with a
//! single `homeroom`) and `SchoolClass` (with `pupils`), plus helpers that
//! wire them into services and a router.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod resource_store_tests;

use axum::Router;
use restbase::prelude::*;
use restbase::impl_resource;

impl_resource!(
    Parent,
    singular: "parent",
    fields: {
        name: String,
    },
    relations: {
        children: many,
    }
);

impl_resource!(
    Child,
    singular: "child",
    fields: {
        name: String,
    },
    relations: {
        homeroom: single,
    }
);

impl_resource!(
    SchoolClass,
    singular: "schoolClass",
    fields: {
        name: String,
        room: Option<String>,
    },
    relations: {
        pupils: many,
    }
);

/// Build a parent with the given name and no children
pub fn parent(name: &str) -> Parent {
    Parent::new(name.to_string())
}

pub fn child(name: &str) -> Child {
    Child::new(name.to_string())
}

/// The stores behind a test application, for direct inspection
pub struct TestStores {
    pub parents: Arc<InMemoryStore<Parent>>,
    pub children: Arc<InMemoryStore<Child>>,
    pub classes: Arc<InMemoryStore<SchoolClass>>,
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            parents: Arc::new(InMemoryStore::new()),
            children: Arc::new(InMemoryStore::new()),
            classes: Arc::new(InMemoryStore::new()),
        }
    }

    pub fn children_store(&self) -> Arc<dyn ResourceStore<Child>> {
        self.children.clone()
    }

    pub fn parent_service(&self) -> ResourceService<Parent> {
        let parents: Arc<dyn ResourceStore<Parent>> = self.parents.clone();
        ResourceService::new(parents)
            .with_relation(
                RelationDescriptor::many("children", self.children_store())
                    .expect("children is a many relationship"),
            )
            .expect("children registered once")
    }

    pub fn child_service(&self) -> ResourceService<Child> {
        let classes: Arc<dyn ResourceStore<SchoolClass>> = self.classes.clone();
        ResourceService::new(self.children_store())
            .with_relation(
                RelationDescriptor::single("homeroom", classes)
                    .expect("homeroom is a single relationship"),
            )
            .expect("homeroom registered once")
    }

    pub fn class_service(&self) -> ResourceService<SchoolClass> {
        let classes: Arc<dyn ResourceStore<SchoolClass>> = self.classes.clone();
        ResourceService::new(classes)
            .with_relation(
                RelationDescriptor::many("pupils", self.children_store())
                    .expect("pupils is a many relationship"),
            )
            .expect("pupils registered once")
    }

    /// Builder with every test resource registered
    pub fn server_builder(&self) -> ServerBuilder {
        ServerBuilder::new()
            .register(self.parent_service())
            .expect("parents registered")
            .register(self.child_service())
            .expect("children registered")
            .register(self.class_service())
            .expect("school classes registered")
    }

    pub fn router(&self) -> Router {
        self.server_builder().build().expect("router builds")
    }
}

/// Create a child directly in the store, returning its id
pub async fn seed_child(stores: &TestStores, name: &str) -> Uuid {
    stores
        .children
        .create(child(name))
        .await
        .expect("child created")
        .id()
        .expect("created child has an id")
}
