//! Envelope wrapping and payload loading for resources
//!
//! Every payload is wrapped under the resource's singular label (one item)
//! or plural label (a collection): `{"parent": {...}}`, `{"parents": [...]}`.
//! Loading a payload requires the expected label to be present.

use crate::core::entity::{CREATE_EXCLUDED_FIELDS, Resource, UPDATE_EXCLUDED_FIELDS};
use crate::core::error::ValidationError;
use crate::core::field::{FieldErrors, INVALID_INPUT_TYPE, MISSING_FIELD, SCHEMA_KEY, UNKNOWN_FIELD};
use crate::core::relation::{Cardinality, RelationValue};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use uuid::Uuid;

/// Singular and plural wrapping labels of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Envelope {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl Envelope {
    pub fn new(singular: &'static str, plural: &'static str) -> Self {
        Self { singular, plural }
    }

    pub fn of<T: Resource>() -> Self {
        Self::new(T::resource_name_singular(), T::resource_name())
    }

    /// Label used for a value of the given cardinality
    pub fn key(&self, cardinality: Cardinality) -> &'static str {
        match cardinality {
            Cardinality::Single => self.singular,
            Cardinality::Many => self.plural,
        }
    }

    pub fn wrap(&self, cardinality: Cardinality, value: Value) -> Value {
        let mut object = Map::with_capacity(1);
        object.insert(self.key(cardinality).to_string(), value);
        Value::Object(object)
    }

    pub fn wrap_one(&self, value: Value) -> Value {
        self.wrap(Cardinality::Single, value)
    }

    pub fn wrap_many(&self, values: Vec<Value>) -> Value {
        self.wrap(Cardinality::Many, Value::Array(values))
    }

    /// Take the value stored under the label for `cardinality`
    pub fn unwrap(&self, payload: Value, cardinality: Cardinality) -> Result<Value, ValidationError> {
        let key = self.key(cardinality);
        match payload {
            Value::Object(mut object) => object
                .remove(key)
                .ok_or_else(|| FieldErrors::single(key, MISSING_FIELD).into()),
            _ => Err(FieldErrors::single(SCHEMA_KEY, INVALID_INPUT_TYPE).into()),
        }
    }

    /// Load identity references wrapped in this envelope
    ///
    /// `many` expects `{"<plural>": [{"id": ...}, ...]}`; `single` expects
    /// `{"<singular>": {"id": ...}}` or `{"<singular>": null}`.
    pub fn load_references(
        &self,
        payload: Value,
        cardinality: Cardinality,
    ) -> Result<RelationValue, ValidationError> {
        let key = self.key(cardinality);
        let body = self.unwrap(payload, cardinality)?;
        let mut errors = FieldErrors::new();

        let value = match (cardinality, body) {
            (Cardinality::Many, Value::Array(items)) => {
                let mut ids = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    if let Some(id) = read_reference(item, &format!("{}.{}", key, index), &mut errors)
                    {
                        ids.push(id);
                    }
                }
                RelationValue::Many(ids)
            }
            (Cardinality::Single, Value::Null) => RelationValue::Single(None),
            (Cardinality::Single, item) => {
                RelationValue::Single(read_reference(item, key, &mut errors))
            }
            (Cardinality::Many, _) => {
                errors.push(key, "Not a valid list.");
                RelationValue::Many(Vec::new())
            }
        };

        if errors.is_empty() {
            Ok(value)
        } else {
            tracing::warn!(resource = self.plural, %errors, "rejected references");
            Err(errors.into())
        }
    }
}

/// Converts between enveloped JSON payloads and typed records of `T`
pub struct ResourceSerializer<T> {
    envelope: Envelope,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceSerializer<T> {
    fn clone(&self) -> Self {
        Self {
            envelope: self.envelope,
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> Default for ResourceSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> ResourceSerializer<T> {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::of::<T>(),
            _marker: PhantomData,
        }
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Serialize a record without an envelope
    pub fn to_value(&self, resource: &T) -> serde_json::Result<Value> {
        serde_json::to_value(resource)
    }

    /// `{"<singular>": {...}}`
    pub fn dump_one(&self, resource: &T) -> serde_json::Result<Value> {
        Ok(self.envelope.wrap_one(self.to_value(resource)?))
    }

    /// `{"<plural>": [...]}`
    pub fn dump_many(&self, resources: &[T]) -> serde_json::Result<Value> {
        let values = resources
            .iter()
            .map(|r| self.to_value(r))
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(self.envelope.wrap_many(values))
    }

    /// Load an enveloped record as-is, base fields included
    pub fn load_one(&self, payload: Value) -> Result<T, ValidationError> {
        let body = self.envelope.unwrap(payload, Cardinality::Single)?;
        self.decode(body, &[])
    }

    /// Load a create payload; server-controlled fields are dropped
    pub fn load_create(&self, payload: Value) -> Result<T, ValidationError> {
        let body = self.envelope.unwrap(payload, Cardinality::Single)?;
        self.decode(body, CREATE_EXCLUDED_FIELDS)
    }

    /// Load an update payload; timestamps are dropped and `id` is required
    pub fn load_update(&self, payload: Value) -> Result<T, ValidationError> {
        let body = self.envelope.unwrap(payload, Cardinality::Single)?;
        let resource = self.decode(body, UPDATE_EXCLUDED_FIELDS)?;
        if resource.id().is_none() {
            return Err(FieldErrors::single("id", MISSING_FIELD).into());
        }
        Ok(resource)
    }

    /// Load identity references to records of `T`
    pub fn load_references(
        &self,
        payload: Value,
        cardinality: Cardinality,
    ) -> Result<RelationValue, ValidationError> {
        self.envelope.load_references(payload, cardinality)
    }

    fn decode(&self, body: Value, excluded: &[&str]) -> Result<T, ValidationError> {
        let Value::Object(mut object) = body else {
            return Err(FieldErrors::single(SCHEMA_KEY, INVALID_INPUT_TYPE).into());
        };

        for field in excluded {
            object.remove(*field);
        }

        let errors = T::validate_fields(&object);
        if !errors.is_empty() {
            tracing::warn!(resource = self.envelope.singular, %errors, "payload failed validation");
            return Err(errors.into());
        }

        serde_json::from_value(Value::Object(object))
            .map_err(|e| FieldErrors::single(SCHEMA_KEY, e.to_string()).into())
    }
}

/// Read `{"id": <uuid>}`, recording problems under `path`
fn read_reference(item: Value, path: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    let Value::Object(mut object) = item else {
        errors.push(path, INVALID_INPUT_TYPE);
        return None;
    };

    for extra in object.keys().filter(|k| *k != "id") {
        errors.push(format!("{}.{}", path, extra), UNKNOWN_FIELD);
    }

    let id_path = format!("{}.id", path);
    match object.remove("id") {
        None => {
            errors.push(id_path, MISSING_FIELD);
            None
        }
        Some(value) => match serde_json::from_value::<Uuid>(value) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(id_path, "Not a valid UUID.");
                None
            }
        },
    }
}
