//! Entity traits defining the core abstraction for all resource types

use crate::core::field::{self, FieldError, FieldErrors};
use crate::core::relation::RelationAccessor;
use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Fields owned by the server: never copied from client input on replace or patch
pub const SERVER_CONTROLLED_FIELDS: &[&str] = &["id", "created", "updated", "active"];

/// Fields stripped from a create payload
pub const CREATE_EXCLUDED_FIELDS: &[&str] = SERVER_CONTROLLED_FIELDS;

/// Fields stripped from an update payload (`id` stays, it names the target)
pub const UPDATE_EXCLUDED_FIELDS: &[&str] = &["created", "updated"];

fn default_active() -> bool {
    true
}

/// Identity and lifecycle fields shared by every resource
///
/// Flattened into each resource struct, so on the wire these appear next to
/// the resource's own fields: `{"id": ..., "created": ..., "name": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Assigned by the store on create, immutable afterwards
    #[serde(default)]
    pub id: Option<Uuid>,

    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,

    /// `false` once soft-deleted; terminal
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self {
            id: None,
            created: None,
            updated: None,
            active: true,
        }
    }
}

impl EntityMeta {
    /// Assign a fresh identity and creation timestamps, returning the id
    pub fn stamp_new(&mut self) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.id = Some(id);
        self.created = Some(now);
        self.updated = Some(now);
        self.active = true;
        id
    }

    /// Advance `updated`, strictly later than its previous value
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated = Some(match self.updated {
            Some(previous) if now <= previous => previous + TimeDelta::microseconds(1),
            _ => now,
        });
    }

    /// Soft-delete: mark inactive and record the change
    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Structural checks for the base fields of a payload
    pub fn validate_fields(object: &Map<String, Value>, errors: &mut FieldErrors) {
        field::check_field::<Option<Uuid>>(object, "id", errors);
        field::check_field::<Option<DateTime<Utc>>>(object, "created", errors);
        field::check_field::<Option<DateTime<Utc>>>(object, "updated", errors);
        field::check_defaulted_field::<bool>(object, "active", errors);
    }
}

/// Base trait for all entities in the system.
///
/// Every entity carries an [`EntityMeta`]: identity, creation and update
/// timestamps, and the soft-delete flag. The envelope labels double as the
/// URL segment (`resource_name`) and the wrapping keys of payloads.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name used in URLs and list envelopes (e.g., "parents")
    fn resource_name() -> &'static str;

    /// The singular resource name used in single-item envelopes (e.g., "parent")
    fn resource_name_singular() -> &'static str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    // === Core Entity Fields ===

    fn id(&self) -> Option<Uuid> {
        self.meta().id
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.meta().created
    }

    fn updated(&self) -> Option<DateTime<Utc>> {
        self.meta().updated
    }

    /// Inactive entities are invisible to every read path
    fn is_active(&self) -> bool {
        self.meta().active
    }
}

/// A resource type whose field list and relationships are declared up front.
///
/// Usually generated by [`impl_resource!`](crate::impl_resource); the declared
/// tables replace any runtime inspection of the struct.
pub trait Resource: Entity {
    /// Declared data fields, excluding the base fields and relationships
    fn field_names() -> &'static [&'static str];

    /// Declared relationship attribute keys
    fn relation_keys() -> &'static [&'static str];

    /// Copy every declared field and relationship from `source`, leaving the
    /// base fields untouched
    fn replace_fields(&mut self, source: Self);

    /// Decode and assign one declared field or relationship by name
    fn apply_field(&mut self, name: &str, value: Value) -> Result<(), FieldError>;

    /// Structural validation of a raw payload object
    fn validate_fields(object: &Map<String, Value>) -> FieldErrors;

    /// Typed accessor pair for a relationship key
    fn relation_accessor(key: &str) -> Option<RelationAccessor<Self>>;
}
