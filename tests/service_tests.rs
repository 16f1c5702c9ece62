//! Tests for ResourceService called directly, without HTTP

mod storage_harness;

use restbase::core::error::EntityError;
use restbase::prelude::*;
use serde_json::{Value, json};
use storage_harness::*;

fn ctx() -> RequestContext {
    RequestContext::detached()
}

fn id_in(body: &Value, key: &str) -> Uuid {
    Uuid::parse_str(body[key]["id"].as_str().expect("id present")).expect("id is a UUID")
}

#[tokio::test]
async fn test_create_then_get() {
    let stores = TestStores::new();
    let service = stores.parent_service();

    let created = service
        .create(&ctx(), json!({"parent": {"name": "p1"}}))
        .await
        .unwrap();
    let id = id_in(&created, "parent");

    let fetched = service.get_by_id(&ctx(), id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let stores = TestStores::new();
    let err = stores
        .parent_service()
        .get_by_id(&ctx(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::Entity(EntityError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let stores = TestStores::new();
    let err = stores
        .parent_service()
        .update(&ctx(), json!({"parent": {"id": Uuid::new_v4(), "name": "x"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::Entity(EntityError::NotFound { .. })));
}

#[tokio::test]
async fn test_list_respects_page() {
    let stores = TestStores::new();
    let service = stores.child_service();
    for i in 0..4 {
        stores.children.create(child(&format!("c{}", i))).await.unwrap();
    }

    let body = service.list(&ctx(), Page::new(2, 3)).await.unwrap();
    assert_eq!(body["children"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_reports_result() {
    let stores = TestStores::new();
    let service = stores.child_service();
    let id = seed_child(&stores, "c1").await;

    assert_eq!(service.delete(&ctx(), id).await.unwrap(), json!({"result": true}));
    assert_eq!(service.delete(&ctx(), id).await.unwrap(), json!({"result": false}));
}

#[tokio::test]
async fn test_unknown_relation_key() {
    let stores = TestStores::new();
    let service = stores.parent_service();
    let err = service
        .get_sub_resource(&ctx(), Uuid::new_v4(), "siblings")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RestError::Entity(EntityError::UnknownRelation { ref relation, .. }) if relation == "siblings"
    ));
}

#[tokio::test]
async fn test_replace_sub_resource_persists_resolved_ids() {
    let stores = TestStores::new();
    let service = stores.parent_service();
    let parent_id = stores.parents.create(parent("p1")).await.unwrap().id().unwrap();
    let c1 = seed_child(&stores, "c1").await;
    let c2 = seed_child(&stores, "c2").await;
    let missing = Uuid::new_v4();

    let body = service
        .replace_sub_resource(
            &ctx(),
            parent_id,
            json!({"children": [{"id": c2}, {"id": missing}, {"id": c1}]}),
            "children",
        )
        .await
        .unwrap();

    let names: Vec<_> = body["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["c2", "c1"]);

    let stored = stores.parents.get(&parent_id).await.unwrap().unwrap();
    assert_eq!(stored.children, vec![c2, c1]);
}

#[tokio::test]
async fn test_delete_dangling_member() {
    let stores = TestStores::new();
    let service = stores.parent_service();
    let c1 = seed_child(&stores, "c1").await;

    let mut seeded = parent("p1");
    seeded.children = vec![c1];
    let parent_id = stores.parents.create(seeded).await.unwrap().id().unwrap();
    stores.children.delete(&c1).await.unwrap();

    // The dangling reference is hidden from reads but can still be removed
    let body = service
        .get_sub_resource(&ctx(), parent_id, "children")
        .await
        .unwrap();
    assert_eq!(body, json!({"children": []}));

    let body = service
        .delete_sub_resource_by_id(&ctx(), parent_id, c1, "children")
        .await
        .unwrap();
    assert_eq!(body, json!({"response": true}));

    let stored = stores.parents.get(&parent_id).await.unwrap().unwrap();
    assert!(stored.children.is_empty());
}

#[tokio::test]
async fn test_single_relation_replace_with_missing_reference() {
    let stores = TestStores::new();
    let service = stores.child_service();
    let child_id = seed_child(&stores, "c1").await;

    let body = service
        .replace_sub_resource(
            &ctx(),
            child_id,
            json!({"schoolClass": {"id": Uuid::new_v4()}}),
            "homeroom",
        )
        .await
        .unwrap();
    assert_eq!(body, json!({"schoolClass": null}));

    let stored = stores.children.get(&child_id).await.unwrap().unwrap();
    assert_eq!(stored.homeroom, None);
}

#[tokio::test]
async fn test_update_prunes_inactive_references() {
    let stores = TestStores::new();
    let service = stores.parent_service();
    let parent_id = stores.parents.create(parent("p1")).await.unwrap().id().unwrap();
    let live = seed_child(&stores, "live").await;
    let gone = seed_child(&stores, "gone").await;
    stores.children.delete(&gone).await.unwrap();

    let body = service
        .update(
            &ctx(),
            json!({"parent": {"id": parent_id, "name": "p1", "children": [live, gone]}}),
        )
        .await
        .unwrap();
    assert_eq!(body["parent"]["children"], json!([live]));
}

#[test]
fn test_relations_are_listed_by_key() {
    let stores = TestStores::new();
    let service = stores.class_service();
    let keys: Vec<_> = service.relations().iter().map(|r| r.key().to_string()).collect();
    assert_eq!(keys, vec!["pupils"]);
    assert_eq!(service.envelope(), Envelope::new("schoolClass", "schoolClasses"));
}

#[test]
fn test_duplicate_relation_is_rejected() {
    let stores = TestStores::new();
    let err = stores
        .parent_service()
        .with_relation(RelationDescriptor::many("children", stores.children_store()).unwrap())
        .err()
        .expect("second registration of children is rejected");
    assert!(matches!(err, ConfigError::DuplicateRelation { .. }));
}

#[test]
fn test_relation_descriptor_checks_declaration() {
    let stores = TestStores::new();
    assert!(matches!(
        RelationDescriptor::<Parent>::many("siblings", stores.children_store()),
        Err(ConfigError::UnknownRelation { .. })
    ));
    assert!(matches!(
        RelationDescriptor::<Parent>::single("children", stores.children_store()),
        Err(ConfigError::CardinalityMismatch { .. })
    ));
}

#[tokio::test]
async fn test_envelope_round_trip_is_stable() {
    let stores = TestStores::new();
    let class = stores
        .classes
        .create(SchoolClass::new("maths".to_string(), None))
        .await
        .unwrap();
    let roomed = stores
        .classes
        .create(SchoolClass::new("art".to_string(), Some("B12".to_string())))
        .await
        .unwrap();

    let mut linked = child("c1");
    linked.homeroom = class.id();
    let linked = stores.children.create(linked).await.unwrap();
    let unlinked = stores.children.create(child("c2")).await.unwrap();

    let classes = stores.class_service();
    for record in [&class, &roomed] {
        let dumped = classes.serializer().dump_one(record).unwrap();
        let reloaded = classes.serializer().load_one(dumped.clone()).unwrap();
        assert_eq!(classes.serializer().dump_one(&reloaded).unwrap(), dumped);
    }

    let children = stores.child_service();
    for record in [&linked, &unlinked] {
        let dumped = children.serializer().dump_one(record).unwrap();
        let reloaded = children.serializer().load_one(dumped.clone()).unwrap();
        assert_eq!(children.serializer().dump_one(&reloaded).unwrap(), dumped);
    }
    assert_eq!(
        children.serializer().dump_one(&linked).unwrap()["child"]["homeroom"],
        json!(class.id())
    );
}
