//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use tamperlog_core::{NewRecord, Payload, Record, RecordContent, RecordHash, Sequence};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::schema::{fields, validate_table_name, SchemaError};
use crate::traits::{links_to_head, next_sequence, InsertResult, Snapshot, Store};

/// Table used when none is given.
pub const DEFAULT_TABLE: &str = "chain_records";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    /// The chain table. Validated as an identifier on construction.
    table: Arc<str>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path, using [`DEFAULT_TABLE`].
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_table(path, DEFAULT_TABLE)
    }

    /// Open a SQLite database and create or migrate the given chain table.
    pub fn open_table(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn, table)?;
        Ok(Self::from_parts(conn, table))
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::open_memory_table(DEFAULT_TABLE)
    }

    /// Open an in-memory SQLite database with the given chain table.
    pub fn open_memory_table(table: &str) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn, table)?;
        Ok(Self::from_parts(conn, table))
    }

    /// Bind to an existing table owned by another application.
    ///
    /// No migration runs and the table is not created. Pair with
    /// [`SchemaGuard`](crate::SchemaGuard) to confirm the table has the
    /// required columns before using it.
    pub fn attach(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let conn = Connection::open(path)?;
        Ok(Self::from_parts(conn, table))
    }

    /// Bind to a table on an already open connection, without migrating.
    pub fn attach_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        Ok(Self::from_parts(conn, table))
    }

    /// The chain table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn from_parts(conn: Connection, table: &str) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            table: Arc::from(table),
        }
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection, &str) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table = Arc::clone(&self.table);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("connection mutex: {}", e)))?;
            f(&mut conn, &table)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Column list for reading records.
///
/// Read without casts: a value edited into another storage class must not be
/// coerced back to something that matches the digest.
const RECORD_COLUMNS: &str = "sequence, previous_hash, hash, payload, created_at, updated_at";

/// A record row exactly as SQLite stored it.
struct RawRecord {
    sequence: Value,
    previous_hash: Value,
    hash: Value,
    payload: Value,
    created_at: Value,
    updated_at: Value,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        sequence: row.get("sequence")?,
        previous_hash: row.get("previous_hash")?,
        hash: row.get("hash")?,
        payload: row.get("payload")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// A decoded row, plus the reason if any content field did not decode.
///
/// An undecodable field is replaced by a placeholder, so the record still
/// carries its stored sequence and links.
struct DecodedRecord {
    record: Record,
    unreadable: Option<String>,
}

impl DecodedRecord {
    fn into_record(self) -> Result<Record> {
        match self.unreadable {
            Some(reason) => Err(StoreError::CorruptRecord {
                sequence: self.record.sequence,
                reason,
            }),
            None => Ok(self.record),
        }
    }
}

impl RawRecord {
    fn decode(self) -> Result<DecodedRecord> {
        let sequence = stored_sequence(self.sequence)?;
        let mut problems = Vec::new();

        let payload = match self.payload {
            Value::Text(text) => Payload::from_json(&text).unwrap_or_else(|e| {
                problems.push(format!("{}: {}", fields::PAYLOAD, e));
                Payload::default()
            }),
            other => {
                problems.push(wrong_type(fields::PAYLOAD, &other));
                Payload::default()
            }
        };
        let created_at = stored_timestamp(fields::CREATED_AT, self.created_at, &mut problems);
        let updated_at = stored_timestamp(fields::UPDATED_AT, self.updated_at, &mut problems);

        let previous_hash = match self.previous_hash {
            Value::Null => None,
            other => Some(RecordHash::from_stored(stored_text(other))),
        };

        Ok(DecodedRecord {
            record: Record {
                sequence,
                content: RecordContent {
                    previous_hash,
                    payload,
                    created_at,
                    updated_at,
                },
                // NULL becomes the empty string, which never equals a digest.
                hash: RecordHash::from_stored(stored_text(self.hash)),
            },
            unreadable: (!problems.is_empty()).then(|| problems.join("; ")),
        })
    }
}

fn stored_sequence(value: Value) -> Result<Sequence> {
    match value {
        Value::Integer(n) if n >= 0 => Ok(Sequence(n as u64)),
        other => Err(StoreError::InvalidSequence {
            raw: format!("{:?}", other),
        }),
    }
}

fn stored_timestamp(field: &str, value: Value, problems: &mut Vec<String>) -> i64 {
    match value {
        Value::Integer(ms) => ms,
        other => {
            problems.push(wrong_type(field, &other));
            0
        }
    }
}

/// Hash columns compare as text; other storage classes are rendered so the
/// comparison fails instead of the read.
fn stored_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(text) => text,
        Value::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

fn wrong_type(field: &str, value: &Value) -> String {
    format!("{} holds {:?}", field, value)
}

fn query_last(conn: &Connection, table: &str) -> Result<Option<Record>> {
    conn.query_row(
        &format!(
            "SELECT {cols} FROM {table} ORDER BY sequence DESC LIMIT 1",
            cols = RECORD_COLUMNS
        ),
        [],
        row_to_raw,
    )
    .optional()?
    .map(|raw| raw.decode()?.into_record())
    .transpose()
}

#[async_trait]
impl Store for SqliteStore {
    async fn fields(&self) -> Result<BTreeSet<String>> {
        self.run(|conn, table| {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>("name"))?
                .collect::<rusqlite::Result<BTreeSet<_>>>()?;

            if names.is_empty() {
                return Err(SchemaError::MissingTable(table.to_string()).into());
            }
            Ok(names)
        })
        .await
    }

    async fn last_record(&self) -> Result<Option<Record>> {
        self.run(|conn, table| query_last(conn, table)).await
    }

    async fn insert_record(&self, record: &NewRecord) -> Result<InsertResult> {
        let record = record.clone();

        self.run(move |conn, table| {
            // IMMEDIATE takes the write lock up front, so the head cannot move
            // between the check and the insert, even across processes.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let head = query_last(&tx, table)?;

            if !links_to_head(&record, head.as_ref()) {
                return Ok(InsertResult::HeadMoved {
                    head: head.map(|h| h.sequence),
                });
            }

            let stored = record.into_record(next_sequence(head.as_ref()));
            tx.execute(
                &format!(
                    "INSERT INTO {table} (sequence, previous_hash, hash, payload, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                ),
                params![
                    stored.sequence.value() as i64,
                    stored.previous_hash().map(RecordHash::as_str),
                    stored.hash.as_str(),
                    stored.payload().to_json(),
                    stored.created_at(),
                    stored.updated_at(),
                ],
            )?;
            tx.commit()?;

            tracing::debug!(table, sequence = %stored.sequence, hash = %stored.hash, "inserted record");
            Ok(InsertResult::Inserted(stored))
        })
        .await
    }

    async fn get_record(&self, sequence: Sequence) -> Result<Option<Record>> {
        self.run(move |conn, table| {
            conn.query_row(
                &format!(
                    "SELECT {cols} FROM {table} WHERE sequence = ?1",
                    cols = RECORD_COLUMNS
                ),
                params![sequence.value() as i64],
                row_to_raw,
            )
            .optional()?
            .map(|raw| raw.decode()?.into_record())
            .transpose()
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn, table| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        self.run(|conn, table| {
            // A read transaction pins the view: the bound and the rows below it
            // come from the same database state.
            let tx = conn.transaction()?;

            let upper_bound: Value = tx.query_row(
                &format!("SELECT MAX(sequence) FROM {table}"),
                [],
                |row| row.get(0),
            )?;

            let bound = match upper_bound {
                Value::Null => return Ok(Snapshot::default()),
                other => stored_sequence(other)?,
            };

            let raw = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {cols} FROM {table} WHERE sequence <= ?1 ORDER BY sequence ASC",
                    cols = RECORD_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![bound.value() as i64], row_to_raw)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            tx.commit()?;

            let mut snapshot = Snapshot {
                upper_bound: Some(bound),
                ..Snapshot::default()
            };
            for row in raw {
                let decoded = row.decode()?;
                if let Some(reason) = decoded.unreadable {
                    tracing::debug!(table, sequence = %decoded.record.sequence, %reason, "stored record does not decode");
                    snapshot.unreadable.insert(decoded.record.sequence, reason);
                }
                snapshot.records.push(decoded.record);
            }

            Ok(snapshot)
        })
        .await
    }
}
