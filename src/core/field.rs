//! Field-level decoding and structural validation
//!
//! Resources declare their fields through `impl_resource!`; the generated code
//! calls into this module to validate payloads field by field and to decode
//! single values for partial updates.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Message used when a required field is absent from a payload
pub const MISSING_FIELD: &str = "Missing data for required field.";

/// Message used when a payload carries a field the resource does not declare
pub const UNKNOWN_FIELD: &str = "Unknown field.";

/// Message used when the payload is not a JSON object
pub const INVALID_INPUT_TYPE: &str = "Invalid input type.";

/// Key under which errors that concern the whole payload are reported
pub const SCHEMA_KEY: &str = "_schema";

/// Field-level validation messages keyed by field path
///
/// Serializes as `{"name": ["Missing data for required field."], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Error raised while applying a single named field to a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    Unknown(String),

    #[error("invalid value for field '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Decode one field value, naming the field in the error
pub fn decode_field<V: DeserializeOwned>(field: &str, value: Value) -> Result<V, FieldError> {
    serde_json::from_value(value).map_err(|e| FieldError::Invalid {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Check that a required field is present and has the declared shape
///
/// Fields whose type accepts `null` (any `Option<_>`) may be omitted.
pub fn check_field<V: DeserializeOwned>(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) {
    match object.get(field) {
        Some(value) => {
            if let Err(e) = V::deserialize(value) {
                errors.push(field, e.to_string());
            }
        }
        None => {
            if V::deserialize(&Value::Null).is_err() {
                errors.push(field, MISSING_FIELD);
            }
        }
    }
}

/// Check a field that falls back to its default when omitted
pub fn check_defaulted_field<V: DeserializeOwned>(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) {
    if let Some(value) = object.get(field) {
        if let Err(e) = V::deserialize(value) {
            errors.push(field, e.to_string());
        }
    }
}

/// Flag every key of `object` that is not part of `known`
pub fn reject_unknown(object: &Map<String, Value>, known: &[&[&str]], errors: &mut FieldErrors) {
    for key in object.keys() {
        if !known.iter().any(|set| set.contains(&key.as_str())) {
            errors.push(key.clone(), UNKNOWN_FIELD);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_check_field_missing_required() {
        let mut errors = FieldErrors::new();
        check_field::<String>(&object(json!({})), "name", &mut errors);
        assert_eq!(errors.get("name"), Some(&[MISSING_FIELD.to_string()][..]));
    }

    #[test]
    fn test_check_field_missing_optional_is_fine() {
        let mut errors = FieldErrors::new();
        check_field::<Option<String>>(&object(json!({})), "nickname", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_check_field_wrong_type() {
        let mut errors = FieldErrors::new();
        check_field::<String>(&object(json!({"name": 12})), "name", &mut errors);
        let messages = errors.get("name").unwrap();
        assert!(messages[0].contains("invalid type"));
    }

    #[test]
    fn test_check_defaulted_field_accepts_absence() {
        let mut errors = FieldErrors::new();
        check_defaulted_field::<Vec<Uuid>>(&object(json!({})), "children", &mut errors);
        assert!(errors.is_empty());

        check_defaulted_field::<Vec<Uuid>>(
            &object(json!({"children": ["nope"]})),
            "children",
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_reject_unknown() {
        let mut errors = FieldErrors::new();
        reject_unknown(
            &object(json!({"name": "a", "blah": 1})),
            &[&["name"], &["children"]],
            &mut errors,
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["blah"]);
    }

    #[test]
    fn test_decode_field_names_field() {
        let err = decode_field::<i64>("age", json!("old")).unwrap_err();
        assert!(matches!(err, FieldError::Invalid { ref field, .. } if field == "age"));
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::single("name", MISSING_FIELD);
        errors.push("name", "second");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value, json!({"name": [MISSING_FIELD, "second"]}));
    }
}
