//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical text and the salted digest. A change to
//! either breaks every stored chain, so a failing vector is a release blocker.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tamperlog_core::{canonical_content, Payload, RecordContent, RecordHash, Salt};

/// Salt used by every vector except the development-salt one.
pub const GOLDEN_SALT: &str = "golden-salt";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Salt the digest is computed with.
    pub salt: &'static str,
    /// Payload fields.
    pub payload: Value,
    /// `previous_hash` (hex), if any.
    pub previous_hash: Option<&'static str>,
    /// Both timestamps.
    pub timestamp: i64,
    /// Expected canonical text.
    pub expected_canonical: &'static str,
    /// Expected digest (hex).
    pub expected_hash: &'static str,
}

impl GoldenVector {
    /// The record content this vector describes.
    pub fn content(&self) -> RecordContent {
        let fields: BTreeMap<String, Value> = match &self.payload {
            Value::Object(map) => map.clone().into_iter().collect(),
            _ => BTreeMap::new(),
        };
        RecordContent::new(
            self.previous_hash.map(RecordHash::from_stored),
            Payload::new(fields).unwrap_or_default(),
            self.timestamp,
        )
    }

    pub fn salt(&self) -> Salt {
        Salt::new(self.salt).unwrap_or_else(|_| panic!("vector {} has an empty salt", self.name))
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "first record",
            salt: GOLDEN_SALT,
            payload: json!({"message": "A"}),
            previous_hash: None,
            timestamp: 1736870400000, // 2025-01-14T16:00:00Z
            expected_canonical: r#"{"created_at":1736870400000,"payload":{"message":"A"},"previous_hash":null,"updated_at":1736870400000}"#,
            expected_hash: "f65e0d8ed7b0946df3f18848c62ac0e8f8a6bfbe83cd8b1517cdb0b08e837dbf",
        },
        GoldenVector {
            name: "second record links to first",
            salt: GOLDEN_SALT,
            payload: json!({"message": "B"}),
            previous_hash: Some("f65e0d8ed7b0946df3f18848c62ac0e8f8a6bfbe83cd8b1517cdb0b08e837dbf"),
            timestamp: 1736870401000,
            expected_canonical: r#"{"created_at":1736870401000,"payload":{"message":"B"},"previous_hash":"f65e0d8ed7b0946df3f18848c62ac0e8f8a6bfbe83cd8b1517cdb0b08e837dbf","updated_at":1736870401000}"#,
            expected_hash: "6cca7e3d49e4eb759c9f1501fac674bbd369d8bd5de29064cada3a86622b6f9f",
        },
        GoldenVector {
            name: "nested payload with unsorted keys",
            salt: GOLDEN_SALT,
            payload: json!({
                "tags": ["x", "y"],
                "meta": {"z": -1, "a": true},
                "count": 3,
                "author": "ops"
            }),
            previous_hash: None,
            timestamp: 1736870402000,
            expected_canonical: r#"{"created_at":1736870402000,"payload":{"author":"ops","count":3,"meta":{"a":true,"z":-1},"tags":["x","y"]},"previous_hash":null,"updated_at":1736870402000}"#,
            expected_hash: "4473811d64f2c16634d50992db85266f2e737b75aaf12a20b0e1fd02654478fc",
        },
        GoldenVector {
            name: "non-ascii text is not escaped",
            salt: GOLDEN_SALT,
            payload: json!({"message": "café"}),
            previous_hash: None,
            timestamp: 1736870400000,
            expected_canonical: r#"{"created_at":1736870400000,"payload":{"message":"café"},"previous_hash":null,"updated_at":1736870400000}"#,
            expected_hash: "9cef6fecdc5c610139ebaea3c289b07d992af285221e98b82a1b5c6df5d21ff2",
        },
        GoldenVector {
            name: "empty payload with development salt",
            salt: tamperlog::DEVELOPMENT_SALT,
            payload: json!({}),
            previous_hash: None,
            timestamp: 0,
            expected_canonical: r#"{"created_at":0,"payload":{},"previous_hash":null,"updated_at":0}"#,
            expected_hash: "b7dabda5c14760ee4f269e45e79d3db269c78fec53d398fc45ee9a2a53dfb295",
        },
    ]
}

/// Check every vector, returning the names of those that fail.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|vector| {
            let content = vector.content();
            canonical_content(&content) != vector.expected_canonical
                || content.digest(&vector.salt()).as_str() != vector.expected_hash
        })
        .map(|vector| vector.name)
        .collect()
}
