//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms a chain table from version N to N+1. Versions are tracked
//! per table so several chains can share one database file.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};
use crate::schema::validate_table_name;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 2;

/// Initialize or migrate the schema of one chain table.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection, table: &str) -> Result<()> {
    validate_table_name(table)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            table_name TEXT NOT NULL,
            version INTEGER NOT NULL,
            applied_at INTEGER NOT NULL,
            PRIMARY KEY (table_name, version)
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations WHERE table_name = ?1",
        params![table],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, table, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (table_name, version, applied_at) VALUES (?1, ?2, ?3)",
                params![table, version, tamperlog_core::now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(table, from = current, to = CURRENT_VERSION, "migrated chain table");
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, table: &str, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn, table),
        2 => apply_v2(conn, table),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: the record table.
fn apply_v1(conn: &Connection, table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            sequence INTEGER PRIMARY KEY,     -- assigned at append, 0-based, never reused
            previous_hash TEXT,               -- hash of the preceding record, NULL for the first
            hash TEXT NOT NULL,               -- hex SHA-256 of canonical content || salt
            payload TEXT NOT NULL,            -- caller fields, JSON object
            created_at INTEGER NOT NULL,      -- Unix ms
            updated_at INTEGER NOT NULL       -- Unix ms, equal to created_at
        );
        "#
    ))?;

    Ok(())
}

/// Migration v2: refuse in-place edits at the storage layer.
///
/// Anyone with write access to the file can drop these triggers. They stop
/// accidental edits through the normal connection; the validator catches the
/// rest.
fn apply_v2(conn: &Connection, table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TRIGGER IF NOT EXISTS {table}_no_update BEFORE UPDATE ON {table}
        BEGIN
            SELECT RAISE(ABORT, 'chain records are append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS {table}_no_delete BEFORE DELETE ON {table}
        BEGIN
            SELECT RAISE(ABORT, 'chain records are append-only');
        END;
        "#
    ))?;

    Ok(())
}
