//! ChainValidator: replays a stored chain and reports the first inconsistency.

use std::collections::BTreeSet;
use std::sync::Arc;

use tamperlog_core::{validate_stored, IntegrityError, Salt, Sequence};
use tamperlog_store::{SchemaGuard, Store};

use crate::error::{ChainError, Result};

/// Summary of a chain that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    /// Number of records checked.
    pub records: usize,
    /// Sequence of the last record checked, `None` for an empty chain.
    pub head: Option<Sequence>,
}

/// Integrity verdict for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    Intact(Verified),
    Compromised(IntegrityError),
}

impl ChainStatus {
    pub fn is_intact(&self) -> bool {
        matches!(self, ChainStatus::Intact(_))
    }
}

/// Validates a chain against the salt it was written with.
///
/// Read-only. Any number of validators may run alongside each other and
/// alongside a writer.
pub struct ChainValidator<S: Store> {
    store: Arc<S>,
    salt: Salt,
}

impl<S: Store> ChainValidator<S> {
    /// Create a validator over `store`, checking its schema first.
    pub async fn new(store: Arc<S>, salt: Salt) -> Result<Self> {
        SchemaGuard::check(store.as_ref()).await?;
        Ok(Self::from_checked(store, salt))
    }

    pub(crate) fn from_checked(store: Arc<S>, salt: Salt) -> Self {
        Self { store, salt }
    }

    /// Check every record up to the current head.
    ///
    /// Pass one walks the links in sequence order; pass two recomputes each
    /// digest. The first failure is returned with the sequence it was found
    /// at. A row whose content no longer decodes fails pass two at that row,
    /// so a broken link at an earlier row is still reported first.
    pub async fn validate(&self) -> Result<Verified> {
        let snapshot = self.store.snapshot().await?;

        for (sequence, reason) in &snapshot.unreadable {
            tracing::warn!(%sequence, %reason, "chain record no longer decodes");
        }

        let unreadable: BTreeSet<Sequence> = snapshot.unreadable.keys().copied().collect();
        if let Err(err) = validate_stored(&snapshot.records, &unreadable, &self.salt) {
            tracing::warn!(at = %err.at(), error = %err, "chain validation failed");
            return Err(err.into());
        }

        let verified = Verified {
            records: snapshot.len(),
            head: snapshot.upper_bound,
        };
        tracing::info!(records = verified.records, head = ?verified.head, "chain intact");
        Ok(verified)
    }

    /// [`validate`](Self::validate), with integrity failures folded into a status.
    ///
    /// Store errors still propagate: an unreadable store is not evidence of
    /// tampering.
    pub async fn status(&self) -> Result<ChainStatus> {
        match self.validate().await {
            Ok(verified) => Ok(ChainStatus::Intact(verified)),
            Err(ChainError::Integrity(err)) => Ok(ChainStatus::Compromised(err)),
            Err(err) => Err(err),
        }
    }
}
