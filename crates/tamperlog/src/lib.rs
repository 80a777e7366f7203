//! # tamperlog
//!
//! Tamper-evident, append-only record chains.
//!
//! ## Overview
//!
//! Every record carries a salted SHA-256 digest of its own content and the
//! digest of the record before it. Editing a stored record, or the link
//! between two records, is detected the next time the chain is validated.
//!
//! - **Writer**: appends records. There is no update or delete.
//! - **Validator**: replays the chain in two passes (links, then contents)
//!   and names the first record found inconsistent.
//! - **Schema guard**: refuses to bind to a store without the chain fields.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tamperlog::{Chain, ChainStatus, ConfigLoader, Payload};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     let chain = Chain::open_sqlite(&config).await?;
//!
//!     chain.append(Payload::message("hello")).await?;
//!
//!     match chain.status().await? {
//!         ChainStatus::Intact(verified) => println!("{} records intact", verified.records),
//!         ChainStatus::Compromised(err) => println!("chain compromised: {}", err),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `tamperlog::core` - Records, payloads, digests and the chain check
//! - `tamperlog::store` - Storage abstraction, SQLite and the schema guard

pub mod chain;
pub mod config;
pub mod error;
pub mod validator;
pub mod writer;

// Re-export component crates
pub use tamperlog_core as core;
pub use tamperlog_store as store;

// Re-export main types for convenience
pub use chain::Chain;
pub use config::{
    ChainConfig, ConfigError, ConfigLoader, DatabaseConfig, Environment, DEVELOPMENT_SALT,
};
pub use error::{ChainError, Mutation, Result};
pub use validator::{ChainStatus, ChainValidator, Verified};
pub use writer::ChainWriter;

// Re-export commonly used core types
pub use tamperlog_core::{IntegrityError, Payload, Record, RecordHash, Salt, Sequence};
