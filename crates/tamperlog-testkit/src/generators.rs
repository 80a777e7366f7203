//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::Value;

use tamperlog_core::{Payload, RecordContent, RecordHash};

/// Generate a payload field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}".prop_map(String::from)
}

/// Generate a JSON leaf that a payload accepts (no floats).
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        "\\PC{0,24}".prop_map(Value::String),
    ]
}

/// Generate a JSON value nested up to a few levels deep.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(field_name(), inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Generate a payload.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop::collection::btree_map(field_name(), json_value(), 0..6).prop_map(|fields| {
        Payload::new(fields).unwrap_or_else(|e| panic!("generated payload rejected: {}", e))
    })
}

/// Generate a short message payload.
pub fn message() -> impl Strategy<Value = Payload> {
    "\\PC{0,32}".prop_map(Payload::message)
}

/// Generate a sequence of payloads to append.
pub fn payloads(max: usize) -> impl Strategy<Value = Vec<Payload>> {
    prop::collection::vec(payload(), 1..=max)
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate a well-formed record hash.
pub fn record_hash() -> impl Strategy<Value = RecordHash> {
    any::<[u8; 32]>().prop_map(RecordHash::from_digest)
}

/// Generate record content.
pub fn record_content() -> impl Strategy<Value = RecordContent> {
    (prop::option::of(record_hash()), payload(), timestamp())
        .prop_map(|(previous_hash, payload, now)| RecordContent::new(previous_hash, payload, now))
}

/// A payload field map together with a permutation of its insertion order.
#[derive(Debug, Clone)]
pub struct ShuffledFields {
    pub fields: BTreeMap<String, Value>,
    pub order: Vec<String>,
}

/// Generate a field map and a shuffled key order for it.
pub fn shuffled_fields() -> impl Strategy<Value = ShuffledFields> {
    prop::collection::btree_map(field_name(), json_leaf(), 1..8).prop_flat_map(|fields| {
        let keys: Vec<String> = fields.keys().cloned().collect();
        Just(keys).prop_shuffle().prop_map(move |order| ShuffledFields {
            fields: fields.clone(),
            order,
        })
    })
}
