//! Golden vectors replayed through real stores.
//!
//! The vectors in the testkit pin the canonical text and digest. These tests
//! check that records carrying those digests, once stored, read back and
//! validate unchanged on both backends.

use std::sync::Arc;

use tamperlog::{ChainValidator, IntegrityError, Salt, Sequence};
use tamperlog_store::{InsertResult, MemoryStore, SqliteStore, Store};
use tamperlog_testkit::vectors::{all_vectors, GOLDEN_SALT};

/// The two linked vectors, in chain order.
fn linked_pair() -> Vec<tamperlog::core::NewRecord> {
    let vectors = all_vectors();
    let salt = Salt::new(GOLDEN_SALT).unwrap();
    vectors[..2]
        .iter()
        .map(|vector| vector.content().seal(&salt))
        .collect()
}

async fn store_pair<S: Store>(store: &S) {
    for record in linked_pair() {
        match store.insert_record(&record).await.unwrap() {
            InsertResult::Inserted(stored) => assert_eq!(stored.hash, record.hash),
            other => panic!("expected insert, got {:?}", other),
        }
    }
}

#[test]
fn golden_vectors_hold() {
    assert_eq!(tamperlog_testkit::verify_all_vectors(), Vec::<&str>::new());
}

#[tokio::test]
async fn golden_chain_validates_in_memory() {
    let store = Arc::new(MemoryStore::new());
    store_pair(store.as_ref()).await;

    let validator = ChainValidator::new(store, Salt::new(GOLDEN_SALT).unwrap())
        .await
        .unwrap();
    let verified = validator.validate().await.unwrap();
    assert_eq!(verified.records, 2);
}

#[tokio::test]
async fn golden_chain_round_trips_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("golden.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store_pair(&store).await;
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let first = store.get_record(Sequence(0)).await.unwrap().unwrap();
    assert_eq!(first.hash.as_str(), all_vectors()[0].expected_hash);
    assert_eq!(first.created_at(), 1736870400000);

    let second = store.get_record(Sequence(1)).await.unwrap().unwrap();
    assert_eq!(second.previous_hash(), Some(&first.hash));
    assert_eq!(second.hash.as_str(), all_vectors()[1].expected_hash);

    let validator = ChainValidator::new(store, Salt::new(GOLDEN_SALT).unwrap())
        .await
        .unwrap();
    validator.validate().await.unwrap();
}

#[tokio::test]
async fn golden_chain_under_another_salt_is_tampered() {
    let store = Arc::new(MemoryStore::new());
    store_pair(store.as_ref()).await;

    let validator = ChainValidator::new(store, Salt::new("not-the-golden-salt").unwrap())
        .await
        .unwrap();
    let err = validator.validate().await.unwrap_err();
    assert_eq!(
        err.integrity(),
        Some(&IntegrityError::ContentTamper { at: Sequence(0) })
    );
}
