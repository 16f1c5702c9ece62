//! Relationship descriptors binding a parent resource to a sub-resource
//!
//! A relationship is an attribute on the parent that holds references to
//! another resource type: a list of ids (`many`) or at most one id
//! (`single`). The attribute is reached through a typed accessor pair
//! generated by `impl_resource!` and resolved once, at registration.

use crate::core::entity::Resource;
use crate::core::error::{ConfigError, RestResult};
use crate::core::serializer::{Envelope, ResourceSerializer};
use crate::core::store::ResourceStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// How many sub-resources a relationship attribute holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

/// The current value of a relationship attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
    Single(Option<Uuid>),
    Many(Vec<Uuid>),
}

impl RelationValue {
    /// Build a value of the given cardinality from a list of ids
    ///
    /// For `single`, only the first id is kept.
    pub fn from_ids(cardinality: Cardinality, ids: Vec<Uuid>) -> Self {
        match cardinality {
            Cardinality::Single => RelationValue::Single(ids.into_iter().next()),
            Cardinality::Many => RelationValue::Many(ids),
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            RelationValue::Single(_) => Cardinality::Single,
            RelationValue::Many(_) => Cardinality::Many,
        }
    }

    pub fn ids(&self) -> Vec<Uuid> {
        match self {
            RelationValue::Single(id) => id.iter().copied().collect(),
            RelationValue::Many(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        match self {
            RelationValue::Single(current) => current.as_ref() == Some(id),
            RelationValue::Many(ids) => ids.contains(id),
        }
    }

    /// Remove `id`; returns whether it was present
    ///
    /// For `many` only the first occurrence is removed.
    pub fn remove(&mut self, id: &Uuid) -> bool {
        match self {
            RelationValue::Single(current) => {
                if current.as_ref() == Some(id) {
                    *current = None;
                    true
                } else {
                    false
                }
            }
            RelationValue::Many(ids) => match ids.iter().position(|m| m == id) {
                Some(index) => {
                    ids.remove(index);
                    true
                }
                None => false,
            },
        }
    }
}

/// Rust types usable as relationship attributes
pub trait RelationField: Sized {
    const CARDINALITY: Cardinality;

    fn to_relation(&self) -> RelationValue;

    fn from_relation(value: RelationValue) -> Self;
}

impl RelationField for Vec<Uuid> {
    const CARDINALITY: Cardinality = Cardinality::Many;

    fn to_relation(&self) -> RelationValue {
        RelationValue::Many(self.clone())
    }

    fn from_relation(value: RelationValue) -> Self {
        value.ids()
    }
}

impl RelationField for Option<Uuid> {
    const CARDINALITY: Cardinality = Cardinality::Single;

    fn to_relation(&self) -> RelationValue {
        RelationValue::Single(*self)
    }

    fn from_relation(value: RelationValue) -> Self {
        value.ids().into_iter().next()
    }
}

/// Typed getter/setter pair for one relationship attribute of `P`
pub struct RelationAccessor<P> {
    pub cardinality: Cardinality,
    pub get: fn(&P) -> RelationValue,
    pub set: fn(&mut P, RelationValue),
}

impl<P> Clone for RelationAccessor<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RelationAccessor<P> {}

impl<P> fmt::Debug for RelationAccessor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationAccessor")
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

/// Type-erased access to the sub-resource side of a relationship
#[async_trait]
pub trait SubResourceResolver: Send + Sync {
    /// Envelope labels of the sub-resource
    fn envelope(&self) -> Envelope;

    /// Serialize the active sub-resource with this id, if any
    async fn resolve(&self, id: &Uuid) -> RestResult<Option<Value>>;
}

/// The sub-resource's store paired with its serializer
pub struct SubResource<C: Resource> {
    store: Arc<dyn ResourceStore<C>>,
    serializer: ResourceSerializer<C>,
}

impl<C: Resource> SubResource<C> {
    pub fn new(store: Arc<dyn ResourceStore<C>>) -> Self {
        Self {
            store,
            serializer: ResourceSerializer::new(),
        }
    }
}

#[async_trait]
impl<C: Resource> SubResourceResolver for SubResource<C> {
    fn envelope(&self) -> Envelope {
        self.serializer.envelope()
    }

    async fn resolve(&self, id: &Uuid) -> RestResult<Option<Value>> {
        match self.store.get(id).await? {
            Some(resource) => Ok(Some(self.serializer.to_value(&resource)?)),
            None => Ok(None),
        }
    }
}

/// Declares how parent resource `P` links to a sub-resource type
///
/// ```rust,ignore
/// let children = RelationDescriptor::<Parent>::many("children", child_store.clone())?;
/// ```
pub struct RelationDescriptor<P: Resource> {
    key: String,
    accessor: RelationAccessor<P>,
    resolver: Arc<dyn SubResourceResolver>,
}

impl<P: Resource> Clone for RelationDescriptor<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            accessor: self.accessor,
            resolver: self.resolver.clone(),
        }
    }
}

impl<P: Resource> fmt::Debug for RelationDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationDescriptor")
            .field("parent", &P::resource_name())
            .field("key", &self.key)
            .field("cardinality", &self.accessor.cardinality)
            .field("sub_resource", &self.resolver.envelope().plural)
            .finish()
    }
}

impl<P: Resource> RelationDescriptor<P> {
    /// Bind `key` on `P` to the sub-resource stored in `store`
    ///
    /// Fails if `P` declares no relationship `key`, or declares it with a
    /// different cardinality.
    pub fn new<C: Resource>(
        key: impl Into<String>,
        cardinality: Cardinality,
        store: Arc<dyn ResourceStore<C>>,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let accessor = P::relation_accessor(&key).ok_or_else(|| ConfigError::UnknownRelation {
            resource: P::resource_name().to_string(),
            key: key.clone(),
        })?;

        if accessor.cardinality != cardinality {
            return Err(ConfigError::CardinalityMismatch {
                resource: P::resource_name().to_string(),
                key,
                declared: accessor.cardinality,
                requested: cardinality,
            });
        }

        Ok(Self {
            key,
            accessor,
            resolver: Arc::new(SubResource::new(store)),
        })
    }

    pub fn many<C: Resource>(
        key: impl Into<String>,
        store: Arc<dyn ResourceStore<C>>,
    ) -> Result<Self, ConfigError> {
        Self::new(key, Cardinality::Many, store)
    }

    pub fn single<C: Resource>(
        key: impl Into<String>,
        store: Arc<dyn ResourceStore<C>>,
    ) -> Result<Self, ConfigError> {
        Self::new(key, Cardinality::Single, store)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cardinality(&self) -> Cardinality {
        self.accessor.cardinality
    }

    pub fn sub_envelope(&self) -> Envelope {
        self.resolver.envelope()
    }

    /// Read the relationship attribute of `parent`
    pub fn get(&self, parent: &P) -> RelationValue {
        (self.accessor.get)(parent)
    }

    /// Overwrite the relationship attribute of `parent`
    pub fn set(&self, parent: &mut P, value: RelationValue) {
        (self.accessor.set)(parent, value)
    }

    pub async fn resolve(&self, id: &Uuid) -> RestResult<Option<Value>> {
        self.resolver.resolve(id).await
    }

    /// Resolve every id, keeping the serialized sub-resources that exist and
    /// are active, in the original order
    pub async fn resolve_all(&self, ids: &[Uuid]) -> RestResult<Vec<(Uuid, Value)>> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(value) = self.resolver.resolve(id).await? {
                resolved.push((*id, value));
            }
        }
        Ok(resolved)
    }
}
