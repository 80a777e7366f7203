//! ChainWriter: the only way records enter a chain.
//!
//! The writer can append. It cannot change or remove a record: the store
//! trait it holds has no such operation, and the `update`/`delete` methods
//! below only return the typed refusal.

use std::sync::Arc;

use tamperlog_core::{now_millis, Payload, Record, RecordContent, Salt, Sequence};
use tamperlog_store::{InsertResult, SchemaGuard, Store};
use tokio::sync::Mutex;

use crate::error::{ChainError, Mutation, Result};

/// Appends records to a chain.
pub struct ChainWriter<S: Store> {
    store: Arc<S>,
    salt: Salt,
    /// Serializes appends made through this writer.
    append_lock: Mutex<()>,
}

impl<S: Store> ChainWriter<S> {
    /// Create a writer over `store`, checking its schema first.
    pub async fn new(store: Arc<S>, salt: Salt) -> Result<Self> {
        SchemaGuard::check(store.as_ref()).await?;
        Ok(Self::from_checked(store, salt))
    }

    /// Create a writer over a store whose schema was already checked.
    pub(crate) fn from_checked(store: Arc<S>, salt: Salt) -> Self {
        Self {
            store,
            salt,
            append_lock: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a record holding `payload` after the current head.
    ///
    /// Links to the head's hash (or `None` on an empty store), stamps both
    /// timestamps with the current time and seals the digest. Fails with
    /// [`ChainError::ConcurrentAppend`] if another writer on the same store
    /// appended first; nothing is written in that case.
    pub async fn append(&self, payload: Payload) -> Result<Record> {
        let _guard = self.append_lock.lock().await;

        let head = self.store.last_record().await?;
        let head_sequence = head.as_ref().map(|h| h.sequence);
        let sealed =
            RecordContent::new(head.map(|h| h.hash), payload, now_millis()).seal(&self.salt);

        match self.store.insert_record(&sealed).await? {
            InsertResult::Inserted(record) => {
                tracing::debug!(
                    sequence = %record.sequence,
                    hash = %record.hash,
                    "appended record"
                );
                Ok(record)
            }
            InsertResult::HeadMoved { head } => {
                tracing::warn!(
                    expected = ?head_sequence,
                    actual = ?head,
                    "chain head moved during append"
                );
                Err(ChainError::ConcurrentAppend { head })
            }
        }
    }

    /// Records are immutable. Always fails with [`ChainError::MutationRejected`].
    pub async fn update(&self, sequence: Sequence, _payload: Payload) -> Result<Record> {
        Err(self.reject(sequence, Mutation::Update))
    }

    /// Records are immutable. Always fails with [`ChainError::MutationRejected`].
    pub async fn delete(&self, sequence: Sequence) -> Result<()> {
        Err(self.reject(sequence, Mutation::Delete))
    }

    fn reject(&self, sequence: Sequence, operation: Mutation) -> ChainError {
        tracing::warn!(%sequence, %operation, "refused mutation of an existing record");
        ChainError::MutationRejected {
            sequence,
            operation,
        }
    }
}
