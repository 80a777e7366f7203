//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tamperlog_core::{NewRecord, Record, Sequence};

use crate::error::{Result, StoreError};
use crate::schema::REQUIRED_FIELDS;
use crate::traits::{links_to_head, next_sequence, InsertResult, Snapshot, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; an
/// insert holds the write lock across the head check, so appends are atomic.
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
    fields: BTreeSet<String>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_fields(REQUIRED_FIELDS.iter().map(|f| f.to_string()))
    }

    /// Create a store that reports the given field set instead of the full one.
    ///
    /// Lets tests exercise the schema guard against a store that lacks columns.
    pub fn with_fields(fields: impl IntoIterator<Item = String>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            fields: fields.into_iter().collect(),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Record>>> {
        self.records
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Record>>> {
        self.records
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Out-of-band edits that bypass the chain, for tamper-detection tests.
#[cfg(any(test, feature = "tamper"))]
impl MemoryStore {
    /// Rewrite a stored record in place. Returns false if it does not exist.
    pub fn tamper_with(&self, sequence: Sequence, edit: impl FnOnce(&mut Record)) -> bool {
        let Ok(mut records) = self.records.write() else {
            return false;
        };
        match records.iter_mut().find(|r| r.sequence == sequence) {
            Some(record) => {
                edit(record);
                true
            }
            None => false,
        }
    }

    /// Remove a stored record. Returns false if it does not exist.
    pub fn remove_raw(&self, sequence: Sequence) -> bool {
        let Ok(mut records) = self.records.write() else {
            return false;
        };
        let before = records.len();
        records.retain(|r| r.sequence != sequence);
        records.len() != before
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fields(&self) -> Result<BTreeSet<String>> {
        Ok(self.fields.clone())
    }

    async fn last_record(&self) -> Result<Option<Record>> {
        Ok(self.read()?.last().cloned())
    }

    async fn insert_record(&self, record: &NewRecord) -> Result<InsertResult> {
        let mut records = self.write()?;
        let head = records.last();

        if !links_to_head(record, head) {
            return Ok(InsertResult::HeadMoved {
                head: head.map(|h| h.sequence),
            });
        }

        let stored = record.clone().into_record(next_sequence(head));
        records.push(stored.clone());
        Ok(InsertResult::Inserted(stored))
    }

    async fn get_record(&self, sequence: Sequence) -> Result<Option<Record>> {
        Ok(self
            .read()?
            .iter()
            .find(|r| r.sequence == sequence)
            .cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.len() as u64)
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        let records = self.read()?.clone();
        Ok(Snapshot {
            upper_bound: records.last().map(|r| r.sequence),
            records,
            unreadable: Default::default(),
        })
    }
}
