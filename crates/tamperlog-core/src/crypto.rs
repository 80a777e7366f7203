//! Cryptographic primitives: SHA-256 hashing and the secret salt.
//!
//! The salt is mixed into every record digest. Forging a record that passes
//! validation requires knowing it, not just the record content.

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use crate::error::SaltError;
use crate::types::RecordHash;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of the concatenation of `parts`.
    pub fn hash_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        Self::hash_parts(&[data])
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl From<Sha256Hash> for RecordHash {
    fn from(hash: Sha256Hash) -> Self {
        RecordHash::from_digest(hash.0)
    }
}

/// The process-wide secret mixed into every digest.
///
/// Cheap to clone and immutable once built. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Arc<str>);

impl Salt {
    /// Create a salt. Empty or whitespace-only values are rejected.
    pub fn new(value: impl AsRef<str>) -> Result<Self, SaltError> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(SaltError::Empty);
        }
        Ok(Self(Arc::from(value)))
    }

    /// The salt bytes as they are appended to the canonical text.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether this salt equals the given value.
    pub fn matches(&self, value: &str) -> bool {
        &*self.0 == value
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt(<redacted, {} bytes>)", self.0.len())
    }
}
