//! SchemaGuard: check a store exposes the fields a chain needs.
//!
//! Runs once when a writer or validator is built. It only reads the store's
//! field list and has no side effects.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::traits::Store;

/// Field names every chain store must expose.
pub mod fields {
    pub const SEQUENCE: &str = "sequence";
    pub const PREVIOUS_HASH: &str = "previous_hash";
    pub const HASH: &str = "hash";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const PAYLOAD: &str = "payload";
}

/// Every field a store must expose: the chain fields plus the payload column.
pub const REQUIRED_FIELDS: [&str; 6] = [
    fields::HASH,
    fields::PREVIOUS_HASH,
    fields::SEQUENCE,
    fields::CREATED_AT,
    fields::UPDATED_AT,
    fields::PAYLOAD,
];

/// Schema problems found before any record is read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("store is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("store table {0} does not exist")]
    MissingTable(String),

    #[error("invalid table name {0:?}: expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidTable(String),
}

/// Checks the field set of a store.
pub struct SchemaGuard;

impl SchemaGuard {
    /// Fail with [`SchemaError::MissingFields`] listing every required field the
    /// store does not expose. Extra fields are allowed.
    pub fn check_fields(exposed: &BTreeSet<String>) -> Result<(), SchemaError> {
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !exposed.contains(**field))
            .map(|field| field.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingFields(missing))
        }
    }

    /// Read the store's field list and check it.
    pub async fn check<S: Store + ?Sized>(store: &S) -> crate::Result<()> {
        let exposed = store.fields().await?;
        Self::check_fields(&exposed)?;
        Ok(())
    }
}

/// Validate a table name so it can be interpolated into SQL.
pub fn validate_table_name(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidTable(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_fields_present() {
        let mut exposed = set(&REQUIRED_FIELDS);
        exposed.insert("author".into());
        assert_eq!(SchemaGuard::check_fields(&exposed), Ok(()));
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            set(&REQUIRED_FIELDS),
            set(&["sequence", "previous_hash", "hash", "created_at", "updated_at", "payload"])
        );
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let exposed = set(&["sequence", "hash", "payload", "created_at"]);
        assert_eq!(
            SchemaGuard::check_fields(&exposed),
            Err(SchemaError::MissingFields(vec![
                "previous_hash".into(),
                "updated_at".into()
            ]))
        );
    }

    #[test]
    fn test_table_names() {
        assert!(validate_table_name("chain_records").is_ok());
        assert!(validate_table_name("_log2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2fast").is_err());
        assert!(validate_table_name("log; DROP TABLE x").is_err());
    }
}
