//! # tamperlog core
//!
//! Pure primitives for tamper-evident record chains: records, the salted
//! canonical digest, and the two-pass chain check.
//!
//! This crate contains no I/O, no storage, no logging. It is pure computation
//! over record values.
//!
//! ## Key Types
//!
//! - [`Record`] - A stored record: sequence, hashed content, digest
//! - [`RecordContent`] - Exactly the fields folded into the digest
//! - [`Payload`] - Caller-defined content fields
//! - [`Salt`] - The secret mixed into every digest
//! - [`IntegrityError`] - `LinkMismatch` / `ContentTamper`, with the sequence
//!
//! ## Canonicalization
//!
//! Digests are SHA-256 over canonical JSON text plus the salt. See the
//! [`canonical`] module for the frozen layout.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod record;
pub mod types;
pub mod validation;

pub use canonical::{canonical_content, record_hash};
pub use crypto::{Salt, Sha256Hash};
pub use error::{IntegrityError, PayloadError, SaltError};
pub use payload::Payload;
pub use record::{NewRecord, Record, RecordContent};
pub use types::{RecordHash, Sequence};
pub use validation::{check_contents, check_links, validate_chain, validate_stored};

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
