//! Macro-generated test suite for `ResourceStore<Parent>` contract validation.
//!
//! The `resource_store_tests!` macro generates a test module that validates
//! any `ResourceStore<Parent>` implementation against the full contract:
//! create, get, replace, patch, soft delete and paginated listing.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use restbase::storage::InMemoryStore;
//!
//! resource_store_tests!(InMemoryStore::<Parent>::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Create & Get
//! - `test_create_assigns_identity`: id, timestamps and `active` are set
//! - `test_create_rejects_identified`: a record with an id is refused
//! - `test_get_nonexistent`: unknown id returns None
//!
//! ## Replace
//! - `test_replace_overwrites_fields`: declared fields and relations replaced
//! - `test_replace_is_monotonic`: `updated` strictly increases, `created` kept
//! - `test_replace_without_id` / `test_replace_unknown_id`: errors
//!
//! ## Patch
//! - `test_patch_named_fields`: only named fields change
//! - `test_patch_is_atomic`: a bad field leaves the record untouched
//! - `test_patch_missing`: unknown id returns None
//!
//! ## Delete & List
//! - `test_delete_is_soft`: deleted records vanish from get/list
//! - `test_delete_twice`: second delete returns false
//! - `test_list_pagination`: page windows over the active records
//! - `test_list_zero_page_is_empty`: a zero page or limit selects nothing
//! - `test_concurrent_creates`: parallel creates from spawned tasks

/// Generate a full `ResourceStore<Parent>` conformance test suite.
///
/// `$factory` must evaluate to a fresh store implementing
/// `ResourceStore<Parent> + Clone + 'static`; it is re-evaluated per test.
#[macro_export]
macro_rules! resource_store_tests {
    ($factory:expr) => {
        mod resource_store_contract_tests {
            use super::*;
            use restbase::core::store::{ResourceStore, StoreError};
            use restbase::core::entity::Entity;
            use restbase::core::query::Page;
            use serde_json::{Map, Value, json};
            use uuid::Uuid;

            fn fields(value: Value) -> Map<String, Value> {
                match value {
                    Value::Object(map) => map,
                    other => panic!("expected an object, got {}", other),
                }
            }

            // ==================================================================
            // Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_assigns_identity() {
                let store = $factory;

                let created = store.create(parent("p1")).await.unwrap();
                let id = created.id().expect("create assigns an id");
                assert!(created.created().is_some());
                assert_eq!(created.created(), created.updated());
                assert!(created.is_active());
                assert_eq!(created.name, "p1");

                let fetched = store.get(&id).await.unwrap().expect("record exists");
                assert_eq!(fetched.name, "p1");
                assert_eq!(fetched.created(), created.created());
            }

            #[tokio::test]
            async fn test_create_rejects_identified() {
                let store = $factory;
                let mut record = parent("p1");
                record.meta.id = Some(Uuid::new_v4());

                let err = store.create(record).await.unwrap_err();
                assert!(matches!(err, StoreError::AlreadyIdentified { .. }));
                assert!(store.list(Page::default()).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            // ==================================================================
            // Replace
            // ==================================================================

            #[tokio::test]
            async fn test_replace_overwrites_fields() {
                let store = $factory;
                let created = store.create(parent("p1")).await.unwrap();
                let child_id = Uuid::new_v4();

                let mut incoming = parent("renamed");
                incoming.meta.id = created.id();
                incoming.children = vec![child_id];

                let replaced = store.replace(incoming).await.unwrap();
                assert_eq!(replaced.name, "renamed");
                assert_eq!(replaced.children, vec![child_id]);
                assert_eq!(replaced.id(), created.id());

                let fetched = store.get(&created.id().unwrap()).await.unwrap().unwrap();
                assert_eq!(fetched.name, "renamed");
            }

            #[tokio::test]
            async fn test_replace_is_monotonic() {
                let store = $factory;
                let created = store.create(parent("p1")).await.unwrap();

                let mut previous = created.updated();
                for name in ["a", "b", "c"] {
                    let mut incoming = parent(name);
                    incoming.meta.id = created.id();
                    // Client-supplied timestamps are ignored
                    incoming.meta.created = None;

                    let replaced = store.replace(incoming).await.unwrap();
                    assert!(replaced.updated() > previous, "updated must increase");
                    assert_eq!(replaced.created(), created.created());
                    previous = replaced.updated();
                }
            }

            #[tokio::test]
            async fn test_replace_without_id() {
                let store = $factory;
                let err = store.replace(parent("p1")).await.unwrap_err();
                assert!(matches!(err, StoreError::MissingIdentity { .. }));
            }

            #[tokio::test]
            async fn test_replace_unknown_id() {
                let store = $factory;
                let mut incoming = parent("p1");
                incoming.meta.id = Some(Uuid::new_v4());

                let err = store.replace(incoming).await.unwrap_err();
                assert!(matches!(err, StoreError::NotFound { .. }));
            }

            // ==================================================================
            // Patch
            // ==================================================================

            #[tokio::test]
            async fn test_patch_named_fields() {
                let store = $factory;
                let mut seeded = parent("p1");
                seeded.children = vec![Uuid::new_v4()];
                let created = store.create(seeded).await.unwrap();
                let id = created.id().unwrap();

                let patched = store
                    .patch(&id, fields(json!({"name": "patched", "created": null})))
                    .await
                    .unwrap()
                    .expect("record exists");

                assert_eq!(patched.name, "patched");
                assert_eq!(patched.children, created.children);
                assert_eq!(patched.created(), created.created());
                assert!(patched.updated() > created.updated());
            }

            #[tokio::test]
            async fn test_patch_is_atomic() {
                let store = $factory;
                let created = store.create(parent("p1")).await.unwrap();
                let id = created.id().unwrap();

                let err = store
                    .patch(&id, fields(json!({"name": "changed", "children": "oops"})))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StoreError::InvalidField { ref field, .. } if field == "children"));

                let err = store
                    .patch(&id, fields(json!({"nickname": "x"})))
                    .await
                    .unwrap_err();
                assert_eq!(err, StoreError::UnknownField("nickname".to_string()));

                let fetched = store.get(&id).await.unwrap().unwrap();
                assert_eq!(fetched.name, "p1");
                assert_eq!(fetched.updated(), created.updated());
            }

            #[tokio::test]
            async fn test_patch_missing() {
                let store = $factory;
                let result = store
                    .patch(&Uuid::new_v4(), fields(json!({"name": "x"})))
                    .await
                    .unwrap();
                assert!(result.is_none());
            }

            // ==================================================================
            // Delete & List
            // ==================================================================

            #[tokio::test]
            async fn test_delete_is_soft() {
                let store = $factory;
                let created = store.create(parent("p1")).await.unwrap();
                let id = created.id().unwrap();

                assert!(store.delete(&id).await.unwrap());
                assert!(store.get(&id).await.unwrap().is_none());
                assert!(store.list(Page::default()).await.unwrap().is_empty());

                let mut incoming = parent("back");
                incoming.meta.id = Some(id);
                assert!(matches!(
                    store.replace(incoming).await,
                    Err(StoreError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_delete_twice() {
                let store = $factory;
                let id = store.create(parent("p1")).await.unwrap().id().unwrap();

                assert!(store.delete(&id).await.unwrap());
                assert!(!store.delete(&id).await.unwrap());
                assert!(!store.delete(&Uuid::new_v4()).await.unwrap());
            }

            #[tokio::test]
            async fn test_list_pagination() {
                let store = $factory;
                let mut ids = Vec::new();
                for i in 0..5 {
                    ids.push(store.create(parent(&format!("p{}", i))).await.unwrap().id().unwrap());
                }
                store.delete(&ids[0]).await.unwrap();

                let all = store.list(Page::new(1, 10)).await.unwrap();
                assert_eq!(all.len(), 4);
                assert!(all.iter().all(|p| p.is_active()));

                let first = store.list(Page::new(1, 3)).await.unwrap();
                let second = store.list(Page::new(2, 3)).await.unwrap();
                let beyond = store.list(Page::new(3, 3)).await.unwrap();
                assert_eq!(first.len(), 3);
                assert_eq!(second.len(), 1);
                assert!(beyond.is_empty());

                let windowed: Vec<_> = first.iter().chain(second.iter()).map(|p| p.id()).collect();
                let listed: Vec<_> = all.iter().map(|p| p.id()).collect();
                assert_eq!(windowed, listed);
            }

            #[tokio::test]
            async fn test_list_zero_page_is_empty() {
                let store = $factory;
                store.create(parent("p1")).await.unwrap();

                assert!(store.list(Page { page: 0, limit: 10 }).await.unwrap().is_empty());
                assert!(store.list(Page { page: 1, limit: 0 }).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_concurrent_creates() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store.create(parent(&format!("p{}", i))).await.unwrap()
                    }));
                }
                for handle in handles {
                    handle.await.unwrap();
                }

                assert_eq!(store.list(Page::new(1, 100)).await.unwrap().len(), 10);
            }
        }
    };
}
