//! Error types for the store module.

use tamperlog_core::Sequence;
use thiserror::Error;

use crate::schema::SchemaError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The backing store does not have the shape a chain needs.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A stored row could not be decoded into a record.
    #[error("corrupt record at sequence {sequence}: {reason}")]
    CorruptRecord { sequence: Sequence, reason: String },

    /// A stored row's sequence is not a non-negative integer, so it cannot
    /// be placed in the chain at all.
    #[error("stored sequence {raw} is not a valid position")]
    InvalidSequence { raw: String },

    /// Record serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The blocking task running a database call failed.
    #[error("store task failed: {0}")]
    Task(String),

    /// A lock guarding the backend was poisoned by a panicking holder.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
