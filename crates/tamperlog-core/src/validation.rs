//! Chain validation: link check, then content check.
//!
//! Records must be given in ascending sequence order, as the store returns
//! them. Both passes stop at the first mismatch.

use std::collections::BTreeSet;

use crate::crypto::Salt;
use crate::error::IntegrityError;
use crate::record::Record;
use crate::types::{RecordHash, Sequence};

/// Validate a full chain: [`check_links`] then [`check_contents`].
///
/// The content pass only runs once every link is intact. An empty chain is
/// valid.
pub fn validate_chain(records: &[Record], salt: &Salt) -> Result<(), IntegrityError> {
    validate_stored(records, &BTreeSet::new(), salt)
}

/// Validate records read back from storage, some of whose content fields
/// could not be decoded.
///
/// `unreadable` names those records. Their stored links still take part in
/// pass 1; in pass 2 each counts as a content mismatch at its position.
pub fn validate_stored(
    records: &[Record],
    unreadable: &BTreeSet<Sequence>,
    salt: &Salt,
) -> Result<(), IntegrityError> {
    check_links(records)?;
    match records
        .iter()
        .find(|record| unreadable.contains(&record.sequence) || !record.content_matches(salt))
    {
        Some(record) => Err(IntegrityError::ContentTamper {
            at: record.sequence,
        }),
        None => Ok(()),
    }
}

/// Pass 1: every record's `previous_hash` equals the stored `hash` of the
/// record before it, and the first record has none.
///
/// Compares stored values only, no digest is recomputed. Catches deleted,
/// inserted and reordered records.
pub fn check_links(records: &[Record]) -> Result<(), IntegrityError> {
    let mut expected_previous: Option<&RecordHash> = None;

    for record in records {
        if record.previous_hash() != expected_previous {
            return Err(IntegrityError::LinkMismatch {
                at: record.sequence,
            });
        }
        expected_previous = Some(&record.hash);
    }

    Ok(())
}

/// Pass 2: every stored `hash` equals the digest recomputed from the record's
/// own content fields and the salt.
///
/// Catches payload and timestamp edits that left the link structure intact.
pub fn check_contents(records: &[Record], salt: &Salt) -> Result<(), IntegrityError> {
    match records.iter().find(|record| !record.content_matches(salt)) {
        Some(record) => Err(IntegrityError::ContentTamper {
            at: record.sequence,
        }),
        None => Ok(()),
    }
}
