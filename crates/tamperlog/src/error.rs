//! Error types for chain operations.

use tamperlog_core::{IntegrityError, PayloadError, Sequence};
use tamperlog_store::{SchemaError, StoreError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// The store does not expose the fields a chain needs.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The stored history was altered outside the append path.
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// The payload cannot be hashed deterministically.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Records are never updated or deleted once written.
    #[error("record {sequence} is immutable: {operation} rejected")]
    MutationRejected {
        sequence: Sequence,
        operation: Mutation,
    },

    /// Another writer appended between reading the head and inserting.
    /// Nothing was written; the caller may append again.
    #[error("chain head moved during append (head now {head:?})")]
    ConcurrentAppend { head: Option<Sequence> },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<StoreError> for ChainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Schema(schema) => ChainError::Schema(schema),
            other => ChainError::Store(other),
        }
    }
}

impl ChainError {
    /// The integrity failure, if this error is one.
    pub fn integrity(&self) -> Option<&IntegrityError> {
        match self {
            ChainError::Integrity(err) => Some(err),
            _ => None,
        }
    }
}

/// A refused in-place mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Update,
    Delete,
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::Update => f.write_str("update"),
            Mutation::Delete => f.write_str("delete"),
        }
    }
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
