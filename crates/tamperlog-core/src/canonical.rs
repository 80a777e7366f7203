//! Canonical text serialization and the salted record digest.
//!
//! The digest input is a compact JSON document over exactly these fields:
//!
//! ```text
//! {"created_at":<i64>,"payload":{...},"previous_hash":<null|"hex">,"updated_at":<i64>}
//! ```
//!
//! - Object keys are sorted by byte order at every nesting level
//! - Integers are plain decimal; floats never reach this module (see [`Payload`])
//! - Strings use JSON escaping
//! - `sequence` and `hash` are never part of the input
//!
//! `digest = hex(SHA-256(canonical_text || salt))`
//!
//! **This layout is frozen.** Changing it invalidates every stored chain.
//!
//! [`Payload`]: crate::payload::Payload

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::crypto::{Salt, Sha256Hash};
use crate::record::RecordContent;
use crate::types::RecordHash;

/// Field names of the digest input.
pub mod keys {
    pub const CREATED_AT: &str = "created_at";
    pub const PAYLOAD: &str = "payload";
    pub const PREVIOUS_HASH: &str = "previous_hash";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Encode the hashed fields of a record to canonical text.
pub fn canonical_content(content: &RecordContent) -> String {
    let mut entries = BTreeMap::new();
    entries.insert(keys::CREATED_AT, Value::from(content.created_at));
    entries.insert(
        keys::PAYLOAD,
        Value::Object(content.payload.fields().clone().into_iter().collect()),
    );
    entries.insert(
        keys::PREVIOUS_HASH,
        match &content.previous_hash {
            Some(hash) => Value::String(hash.as_str().to_string()),
            None => Value::Null,
        },
    );
    entries.insert(keys::UPDATED_AT, Value::from(content.updated_at));

    let document = Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    );
    canonicalize(&document).to_string()
}

/// Compute the salted digest of a record's content fields.
pub fn record_hash(content: &RecordContent, salt: &Salt) -> RecordHash {
    let text = canonical_content(content);
    Sha256Hash::hash_parts(&[text.as_bytes(), salt.as_bytes()]).into()
}

/// Rebuild a JSON value with every object's keys inserted in sorted order.
///
/// Insertion order is what `serde_json` prints in when `preserve_order` is
/// enabled anywhere in the build, and sorted order is what it prints otherwise,
/// so inserting sorted keys gives the same text either way.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            let mut out = Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use serde_json::json;

    fn salt() -> Salt {
        Salt::new("test-salt").unwrap()
    }

    fn content(payload: Payload, previous_hash: Option<RecordHash>) -> RecordContent {
        RecordContent {
            previous_hash,
            payload,
            created_at: 1736870400000,
            updated_at: 1736870400000,
        }
    }

    #[test]
    fn test_canonical_layout() {
        let text = canonical_content(&content(Payload::message("A"), None));
        assert_eq!(
            text,
            r#"{"created_at":1736870400000,"payload":{"message":"A"},"previous_hash":null,"updated_at":1736870400000}"#
        );
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let payload = Payload::try_from(json!({"z": {"b": 1, "a": 2}, "m": [{"y": 0, "x": 0}]}))
            .unwrap();
        let text = canonical_content(&content(payload, None));
        assert!(text.contains(r#""payload":{"m":[{"x":0,"y":0}],"z":{"a":2,"b":1}}"#));
    }

    #[test]
    fn test_canonical_includes_previous_hash() {
        let prev = RecordHash::from_digest([0x11; 32]);
        let text = canonical_content(&content(Payload::message("B"), Some(prev.clone())));
        assert!(text.contains(&format!(r#""previous_hash":"{}""#, prev.as_str())));
    }

    #[test]
    fn test_record_hash_deterministic() {
        let c = content(Payload::message("A"), None);
        assert_eq!(record_hash(&c, &salt()), record_hash(&c, &salt()));
        assert!(record_hash(&c, &salt()).is_well_formed());
    }

    #[test]
    fn test_record_hash_depends_on_salt() {
        let c = content(Payload::message("A"), None);
        let other = Salt::new("other-salt").unwrap();
        assert_ne!(record_hash(&c, &salt()), record_hash(&c, &other));
    }

    #[test]
    fn test_record_hash_covers_every_field() {
        let base = content(Payload::message("A"), None);
        let h = record_hash(&base, &salt());

        let mut changed = base.clone();
        changed.payload = Payload::message("a");
        assert_ne!(record_hash(&changed, &salt()), h);

        let mut changed = base.clone();
        changed.created_at += 1;
        assert_ne!(record_hash(&changed, &salt()), h);

        let mut changed = base.clone();
        changed.updated_at += 1;
        assert_ne!(record_hash(&changed, &salt()), h);

        let mut changed = base;
        changed.previous_hash = Some(RecordHash::from_digest([0; 32]));
        assert_ne!(record_hash(&changed, &salt()), h);
    }

    #[test]
    fn test_record_hash_matches_manual_computation() {
        let c = content(Payload::message("A"), None);
        let manual = Sha256Hash::hash(format!("{}test-salt", canonical_content(&c)).as_bytes());
        assert_eq!(record_hash(&c, &salt()).as_str(), manual.to_hex());
    }
}
