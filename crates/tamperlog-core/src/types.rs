//! Strong type definitions for record chains.
//!
//! Identifiers are newtypes so a sequence number can never be confused with a
//! row count and a stored hash can never be confused with arbitrary text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a record in the chain, assigned by the store at append time.
///
/// The first record ever appended is `Sequence(0)`; each later record is the
/// previous sequence plus one. A sequence is never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sequence(pub u64);

impl Sequence {
    /// The sequence of the first record in a chain.
    pub const FIRST: Self = Self(0);

    /// Create a sequence from its raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The sequence that follows this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence({})", self.0)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Sequence {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A record digest as it is stored: lowercase hex of a SHA-256 output.
///
/// Freshly computed hashes are always 64 hex characters. Values read back from
/// storage are kept verbatim, even when an out-of-band edit left something that
/// is not hex at all, so the validator can report the mismatch instead of the
/// store failing to decode the row.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordHash(String);

impl RecordHash {
    /// Build from raw digest bytes.
    pub fn from_digest(bytes: [u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Wrap a hash value exactly as it was read from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this value has the shape of a digest produced by this crate.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 64 && self.0.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Consume into the hex text.
    pub fn into_string(self) -> String {
        self.0
    }

    fn short(&self) -> &str {
        self.0.get(..16).unwrap_or(&self.0)
    }
}

impl fmt::Debug for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordHash({})", self.short())
    }
}

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

impl AsRef<str> for RecordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
