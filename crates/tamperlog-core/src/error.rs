//! Error types for tamperlog core.

use thiserror::Error;

use crate::types::Sequence;

/// Errors building a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("payload field {path} holds a non-integer number")]
    NonIntegerNumber { path: String },

    #[error("payload serialization failed: {0}")]
    Serialization(String),
}

/// Errors building a salt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaltError {
    #[error("salt must not be empty")]
    Empty,
}

/// Chain integrity failures found while replaying stored records.
///
/// Both kinds mean the stored history was altered outside the append path.
/// They are never transient and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("chain link broken at sequence {at}: previous_hash does not match the preceding record")]
    LinkMismatch { at: Sequence },

    #[error("content tampered at sequence {at}: stored hash does not match recomputed digest")]
    ContentTamper { at: Sequence },
}

impl IntegrityError {
    /// The sequence of the first record found to be inconsistent.
    pub fn at(&self) -> Sequence {
        match self {
            IntegrityError::LinkMismatch { at } | IntegrityError::ContentTamper { at } => *at,
        }
    }
}
