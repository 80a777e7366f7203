//! Store trait: the append-only interface for record persistence.
//!
//! The trait has no update or delete operation. Code holding a `Store` can
//! read the chain and append to it, nothing else.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tamperlog_core::{NewRecord, Record, Sequence};

use crate::error::{Result, StoreError};

/// Result of inserting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// The record was appended and assigned a sequence.
    Inserted(Record),
    /// The chain head is not the record the new record links to: another
    /// writer appended first. Nothing was written.
    HeadMoved {
        /// Sequence of the current head, if the store is not empty.
        head: Option<Sequence>,
    },
}

/// A consistent view of the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Highest sequence present when the snapshot was taken.
    pub upper_bound: Option<Sequence>,
    /// Every record with `sequence <= upper_bound`, ascending.
    pub records: Vec<Record>,
    /// Records whose stored content fields could not be decoded, with the
    /// reason. Their entries in `records` keep the stored sequence and links;
    /// the undecodable fields hold placeholders.
    pub unreadable: BTreeMap<Sequence, String>,
}

impl Snapshot {
    /// The records, failing with [`StoreError::CorruptRecord`] for the first
    /// one that could not be decoded.
    pub fn into_records(self) -> Result<Vec<Record>> {
        match self.unreadable.into_iter().next() {
            Some((sequence, reason)) => Err(StoreError::CorruptRecord { sequence, reason }),
            None => Ok(self.records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The Store trait: async interface for record persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
#[async_trait]
pub trait Store: Send + Sync {
    /// Names of the fields (columns) the store exposes.
    async fn fields(&self) -> Result<BTreeSet<String>>;

    /// The record with the highest sequence, if any.
    async fn last_record(&self) -> Result<Option<Record>>;

    /// Atomically append a record after the current head.
    ///
    /// The head is re-read inside the same transaction. The record is written
    /// only if its `previous_hash` equals the head's `hash`, or the store is
    /// empty and `previous_hash` is `None`. The assigned sequence is the head's
    /// sequence plus one, or [`Sequence::FIRST`].
    async fn insert_record(&self, record: &NewRecord) -> Result<InsertResult>;

    /// Get a record by sequence.
    async fn get_record(&self, sequence: Sequence) -> Result<Option<Record>>;

    /// Number of stored records.
    async fn count(&self) -> Result<u64>;

    /// Read every record up to the head as of the start of the call.
    ///
    /// Appends that land while the snapshot is read are not included.
    async fn snapshot(&self) -> Result<Snapshot>;
}

/// Whether `record` may follow `head`.
pub(crate) fn links_to_head(record: &NewRecord, head: Option<&Record>) -> bool {
    record.content.previous_hash.as_ref() == head.map(|h| &h.hash)
}

/// The sequence a record appended after `head` receives.
pub(crate) fn next_sequence(head: Option<&Record>) -> Sequence {
    head.map(|h| h.sequence.next()).unwrap_or(Sequence::FIRST)
}
