//! Test fixtures and helpers.
//!
//! Common setup code for integration tests, including the out-of-band edits
//! used to simulate someone tampering with storage directly.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{params, Connection};
use serde_json::Value;
use tamperlog::{Chain, Payload, Record, Result, Salt};
use tamperlog_store::{MemoryStore, SqliteStore, DEFAULT_TABLE};
use tempfile::TempDir;

/// Salt shared by the fixtures.
pub const FIXTURE_SALT: &str = "fixture-salt";

/// The fixture salt.
pub fn fixture_salt() -> Salt {
    Salt::new(FIXTURE_SALT).unwrap_or_else(|e| panic!("fixture salt: {}", e))
}

/// A chain over a memory store, with the store kept for tampering.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
    pub chain: Chain<MemoryStore>,
}

impl TestFixture {
    /// Create an empty chain.
    pub async fn new() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let chain = Chain::from_shared(store.clone(), fixture_salt()).await?;
        Ok(Self { store, chain })
    }

    /// Create a chain holding one message record per entry, in order.
    pub async fn with_messages(messages: &[&str]) -> Result<Self> {
        let fixture = Self::new().await?;
        append_messages(&fixture.chain, messages).await?;
        Ok(fixture)
    }
}

/// A chain over a SQLite file in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct SqliteFixture {
    pub dir: TempDir,
    pub path: PathBuf,
    pub chain: Chain<SqliteStore>,
}

impl SqliteFixture {
    /// Create an empty chain in a fresh database file.
    pub async fn new() -> Result<Self> {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {}", e));
        let path = dir.path().join("chain.db");
        let chain = Chain::new(SqliteStore::open(&path)?, fixture_salt()).await?;
        Ok(Self { dir, path, chain })
    }

    /// Create a chain holding one message record per entry, in order.
    pub async fn with_messages(messages: &[&str]) -> Result<Self> {
        let fixture = Self::new().await?;
        append_messages(&fixture.chain, messages).await?;
        Ok(fixture)
    }

    /// Open a second connection to the database, with the append-only
    /// triggers dropped, as an attacker with file access would.
    pub fn tamper_connection(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(&format!(
            "DROP TRIGGER IF EXISTS {table}_no_update;
             DROP TRIGGER IF EXISTS {table}_no_delete;",
            table = DEFAULT_TABLE
        ))?;
        Ok(conn)
    }

    /// Overwrite the stored payload of one record.
    pub fn tamper_payload(&self, sequence: u64, payload: &Value) -> rusqlite::Result<usize> {
        self.tamper_connection()?.execute(
            &format!(
                "UPDATE {table} SET payload = ?1 WHERE sequence = ?2",
                table = DEFAULT_TABLE
            ),
            params![payload.to_string(), sequence as i64],
        )
    }

    /// Overwrite the stored `previous_hash` of one record.
    pub fn tamper_previous_hash(&self, sequence: u64, previous: Option<&str>) -> rusqlite::Result<usize> {
        self.tamper_connection()?.execute(
            &format!(
                "UPDATE {table} SET previous_hash = ?1 WHERE sequence = ?2",
                table = DEFAULT_TABLE
            ),
            params![previous, sequence as i64],
        )
    }

    /// Run arbitrary SQL against the database with the triggers dropped.
    pub fn tamper_sql(&self, sql: &str) -> rusqlite::Result<()> {
        self.tamper_connection()?.execute_batch(sql)
    }
}

async fn append_messages<S: tamperlog_store::Store>(
    chain: &Chain<S>,
    messages: &[&str],
) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(messages.len());
    for message in messages {
        records.push(chain.append(Payload::message(*message)).await?);
    }
    Ok(records)
}
