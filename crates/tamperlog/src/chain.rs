//! Chain: a store with its writer and validator.

use std::sync::Arc;

use tamperlog_core::{Payload, Record, Salt, Sequence};
use tamperlog_store::{SchemaGuard, SqliteStore, Store};

use crate::config::ChainConfig;
use crate::error::Result;
use crate::validator::{ChainStatus, ChainValidator, Verified};
use crate::writer::ChainWriter;

/// A chain bound to one store and one salt.
///
/// The schema is checked once, when the chain is opened.
pub struct Chain<S: Store> {
    store: Arc<S>,
    writer: ChainWriter<S>,
    validator: ChainValidator<S>,
}

impl<S: Store> Chain<S> {
    /// Open a chain over `store`.
    pub async fn new(store: S, salt: Salt) -> Result<Self> {
        Self::from_shared(Arc::new(store), salt).await
    }

    /// Open a chain over a store shared with other handles.
    pub async fn from_shared(store: Arc<S>, salt: Salt) -> Result<Self> {
        SchemaGuard::check(store.as_ref()).await?;
        Ok(Self {
            writer: ChainWriter::from_checked(store.clone(), salt.clone()),
            validator: ChainValidator::from_checked(store.clone(), salt),
            store,
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn writer(&self) -> &ChainWriter<S> {
        &self.writer
    }

    pub fn validator(&self) -> &ChainValidator<S> {
        &self.validator
    }

    /// See [`ChainWriter::append`].
    pub async fn append(&self, payload: Payload) -> Result<Record> {
        self.writer.append(payload).await
    }

    /// See [`ChainValidator::validate`].
    pub async fn validate(&self) -> Result<Verified> {
        self.validator.validate().await
    }

    /// See [`ChainValidator::status`].
    pub async fn status(&self) -> Result<ChainStatus> {
        self.validator.status().await
    }

    /// Every stored record in sequence order, without checking integrity.
    ///
    /// Fails with a corrupt-record error if any row no longer decodes.
    pub async fn records(&self) -> Result<Vec<Record>> {
        Ok(self.store.snapshot().await?.into_records()?)
    }

    /// Get a record by sequence.
    pub async fn get(&self, sequence: Sequence) -> Result<Option<Record>> {
        Ok(self.store.get_record(sequence).await?)
    }
}

impl Chain<SqliteStore> {
    /// Open the chain described by `config`.
    ///
    /// Creates the database file and table if needed. With no path configured
    /// the chain lives in memory.
    pub async fn open_sqlite(config: &ChainConfig) -> Result<Self> {
        let salt = config.salt()?;
        let table = &config.database.table;
        let store = match &config.database.path {
            Some(path) => SqliteStore::open_table(path, table)?,
            None => SqliteStore::open_memory_table(table)?,
        };
        tracing::debug!(
            path = ?config.database.path,
            table = %table,
            environment = ?config.environment,
            "opening chain"
        );
        Self::new(store, salt).await
    }
}
