//! Record: the unit of a chain.
//!
//! A record is created once and never edited. Its `hash` commits to its own
//! content and, through `previous_hash`, to every record before it.

use serde::{Deserialize, Serialize};

use crate::canonical::record_hash;
use crate::crypto::Salt;
use crate::payload::Payload;
use crate::types::{RecordHash, Sequence};

/// The fields folded into a record's digest.
///
/// Everything a record holds except `sequence` and `hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContent {
    /// Hash of the record immediately before this one; `None` only for the
    /// first record ever appended.
    pub previous_hash: Option<RecordHash>,

    /// Caller-supplied content.
    pub payload: Payload,

    /// Creation time (Unix milliseconds).
    pub created_at: i64,

    /// Equal to `created_at`; records are never updated.
    pub updated_at: i64,
}

impl RecordContent {
    /// Content for a record created at `now` after the record hashed `previous_hash`.
    pub fn new(previous_hash: Option<RecordHash>, payload: Payload, now: i64) -> Self {
        Self {
            previous_hash,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    /// Digest this content with the given salt.
    pub fn digest(&self, salt: &Salt) -> RecordHash {
        record_hash(self, salt)
    }

    /// Seal into a record ready for insertion.
    pub fn seal(self, salt: &Salt) -> NewRecord {
        let hash = self.digest(salt);
        NewRecord {
            content: self,
            hash,
        }
    }
}

/// A sealed record that the store has not yet assigned a sequence to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub content: RecordContent,
    pub hash: RecordHash,
}

impl NewRecord {
    /// Attach the sequence the store assigned.
    pub fn into_record(self, sequence: Sequence) -> Record {
        Record {
            sequence,
            content: self.content,
            hash: self.hash,
        }
    }
}

/// A record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position in the chain.
    pub sequence: Sequence,

    /// The hashed fields.
    #[serde(flatten)]
    pub content: RecordContent,

    /// Digest computed at creation. Never recomputed in place.
    pub hash: RecordHash,
}

impl Record {
    pub fn previous_hash(&self) -> Option<&RecordHash> {
        self.content.previous_hash.as_ref()
    }

    pub fn payload(&self) -> &Payload {
        &self.content.payload
    }

    pub fn created_at(&self) -> i64 {
        self.content.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.content.updated_at
    }

    /// Whether this is the first record of a chain (no predecessor).
    pub fn is_genesis(&self) -> bool {
        self.content.previous_hash.is_none()
    }

    /// Recompute the digest from the stored content and compare to `hash`.
    pub fn content_matches(&self, salt: &Salt) -> bool {
        self.content.digest(salt) == self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salt() -> Salt {
        Salt::new("test-salt").unwrap()
    }

    #[test]
    fn test_new_content_sets_equal_timestamps() {
        let content = RecordContent::new(None, Payload::message("A"), 1000);
        assert_eq!(content.created_at, 1000);
        assert_eq!(content.updated_at, 1000);
    }

    #[test]
    fn test_sealed_record_matches_content() {
        let record = RecordContent::new(None, Payload::message("A"), 1000)
            .seal(&salt())
            .into_record(Sequence::FIRST);
        assert!(record.is_genesis());
        assert!(record.content_matches(&salt()));
    }

    #[test]
    fn test_tampered_payload_no_longer_matches() {
        let mut record = RecordContent::new(None, Payload::message("A"), 1000)
            .seal(&salt())
            .into_record(Sequence::FIRST);
        record.content.payload = Payload::message("forged");
        assert!(!record.content_matches(&salt()));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = RecordContent::new(None, Payload::message("A"), 1000)
            .seal(&salt())
            .into_record(Sequence(7));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sequence"], 7);
        assert_eq!(json["previous_hash"], serde_json::Value::Null);
        assert_eq!(json["payload"]["message"], "A");
        assert_eq!(json["hash"], record.hash.as_str());
    }
}
