//! Payload: the caller-supplied content of a record.
//!
//! A payload is a JSON object of caller-defined fields. It must serialize the
//! same way every time, so non-integer numbers are rejected at construction:
//! float formatting is the one part of JSON that is not canonical.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::PayloadError;

/// Field name used by [`Payload::message`].
pub const MESSAGE_FIELD: &str = "message";

/// The content fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct Payload {
    fields: BTreeMap<String, Value>,
}

impl Payload {
    /// Build a payload from its fields.
    pub fn new(fields: BTreeMap<String, Value>) -> Result<Self, PayloadError> {
        for (key, value) in &fields {
            check_value(key, value)?;
        }
        Ok(Self { fields })
    }

    /// Build a payload from any value that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, PayloadError> {
        let value =
            serde_json::to_value(value).map_err(|e| PayloadError::Serialization(e.to_string()))?;
        Self::try_from(value)
    }

    /// A single-field payload `{"message": text}`.
    pub fn message(text: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(text.into()));
        Self { fields }
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `message` field, if present and textual.
    pub fn message_text(&self) -> Option<&str> {
        self.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    /// All fields, ordered by key.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as JSON text for storage.
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone().into_iter().collect()).to_string()
    }

    /// Decode from stored JSON text.
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| PayloadError::Serialization(e.to_string()))?;
        Self::try_from(value)
    }
}

impl TryFrom<BTreeMap<String, Value>> for Payload {
    type Error = PayloadError;

    fn try_from(fields: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl TryFrom<Value> for Payload {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Self::new(map.into_iter().collect()),
            other => Err(PayloadError::NotAnObject(json_kind(&other))),
        }
    }
}

impl From<Payload> for BTreeMap<String, Value> {
    fn from(payload: Payload) -> Self {
        payload.fields
    }
}

fn check_value(path: &str, value: &Value) -> Result<(), PayloadError> {
    match value {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => Err(PayloadError::NonIntegerNumber {
            path: path.to_string(),
        }),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_value(&format!("{}[{}]", path, i), item)),
        Value::Object(map) => map
            .iter()
            .try_for_each(|(k, v)| check_value(&format!("{}.{}", path, k), v)),
        _ => Ok(()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_payload() {
        let payload = Payload::message("A");
        assert_eq!(payload.message_text(), Some("A"));
        assert_eq!(payload.to_json(), r#"{"message":"A"}"#);
    }

    #[test]
    fn test_rejects_non_object() {
        let result = Payload::try_from(json!("A"));
        assert_eq!(result, Err(PayloadError::NotAnObject("string")));
    }

    #[test]
    fn test_rejects_nested_float() {
        let result = Payload::try_from(json!({"reading": {"values": [1, 2.5]}}));
        assert_eq!(
            result,
            Err(PayloadError::NonIntegerNumber {
                path: "reading.values[1]".into()
            })
        );
    }

    #[test]
    fn test_accepts_integers_and_nesting() {
        let payload = Payload::try_from(json!({
            "count": 3,
            "big": u64::MAX,
            "neg": -7,
            "tags": ["a", "b"],
            "meta": {"ok": true, "note": null}
        }))
        .unwrap();
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn test_json_roundtrip_through_storage_text() {
        let payload = Payload::try_from(json!({"b": 1, "a": [true, null]})).unwrap();
        let restored = Payload::from_json(&payload.to_json()).unwrap();
        assert_eq!(payload, restored);
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct Visit {
            visitor: &'static str,
            floor: u8,
        }

        let payload = Payload::from_serialize(&Visit {
            visitor: "ana",
            floor: 3,
        })
        .unwrap();
        assert_eq!(payload.get("floor"), Some(&json!(3)));
    }
}
