//! # tamperlog testkit
//!
//! Testing utilities for tamperlog.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records with their canonical text and digest
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Ready-made chains on both backends, with tamper helpers
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical layout and the salted digest:
//!
//! ```rust
//! use tamperlog_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let hash = vector.content().digest(&vector.salt());
//!     println!("{}: {}", vector.name, hash.as_str());
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use tamperlog_testkit::generators::record_content;
//!
//! proptest! {
//!     #[test]
//!     fn digest_is_deterministic(content in record_content()) {
//!         let salt = tamperlog_testkit::fixture_salt();
//!         prop_assert_eq!(content.digest(&salt), content.digest(&salt));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use tamperlog_testkit::SqliteFixture;
//!
//! let fixture = SqliteFixture::with_messages(&["A", "B"]).await?;
//! fixture.tamper_payload(0, &serde_json::json!({"message": "Z"}))?;
//! assert!(fixture.chain.validate().await.is_err());
//! ```

use std::sync::Once;

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fixture_salt, SqliteFixture, TestFixture, FIXTURE_SALT};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};

/// Install a `tracing` subscriber that writes to the test harness.
///
/// Respects `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
