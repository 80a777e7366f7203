//! # tamperlog store
//!
//! Append-only storage for record chains. Provides a trait-based interface
//! with SQLite and in-memory implementations, plus the schema guard.
//!
//! ## Overview
//!
//! The [`Store`] trait can read a chain and append to it. It has no way to
//! update or delete a record. The primary implementation is [`SqliteStore`],
//! with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of appending a record
//! - [`Snapshot`] - A consistent read of the whole chain
//! - [`SchemaGuard`] - Checks a store exposes the fields a chain needs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tamperlog_store::{SchemaGuard, SqliteStore, Store};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("chain.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     SchemaGuard::check(&store).await.unwrap();
//!     let snapshot = store.snapshot().await.unwrap();
//!     println!("{} records", snapshot.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic appends**: the head is re-read inside the insert transaction; a
//!   record sealed against a stale head returns `HeadMoved` and is not written
//! - **Dense sequences**: the first record is sequence 0, each append adds one
//! - **Consistent snapshots**: validation reads a fixed upper bound and every
//!   record below it in one read transaction

pub mod error;
pub mod memory;
pub mod migration;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use schema::{SchemaError, SchemaGuard, REQUIRED_FIELDS};
pub use sqlite::{SqliteStore, DEFAULT_TABLE};
pub use traits::{InsertResult, Snapshot, Store};
