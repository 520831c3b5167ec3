//! End-to-end reaction flow tests over the in-memory store
//!
//! Concurrency properties run with real task parallelism on a
//! multi-threaded runtime.

use std::sync::Arc;

use async_trait::async_trait;
use quipboard::model::{CounterMap, QuoteRecord};
use quipboard::reaction::{ModerationPolicy, ReactionOutcome, ReactionService, ReactionUpdater};
use quipboard::store::{MemoryStore, ReactionStore, WriteOutcome};
use quipboard::types::{ReactionError, Result};

fn migrated_record(id: &str) -> QuoteRecord {
    QuoteRecord::new(id, "Asha", "Deploys on Friday, prays on Saturday.")
}

fn legacy_record(id: &str) -> QuoteRecord {
    QuoteRecord::legacy(id, "Rohan", "Uses dark mode to hide the bugs.")
}

fn default_service(store: Arc<MemoryStore>) -> Arc<ReactionService> {
    Arc::new(ReactionService::new(store, ModerationPolicy::default()))
}

/// N concurrent increments of one name on a migrated record apply exactly once each.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_apply_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    store.insert(migrated_record("q1"));
    let service = default_service(store.clone());

    let n = 64;
    let mut handles = Vec::with_capacity(n);
    for _ in 0..n {
        let service = service.clone();
        handles.push(tokio::spawn(
            async move { service.process("q1", "laugh").await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = store.get("q1").await.unwrap().unwrap();
    assert_eq!(record.count("laugh"), n as u64);
}

/// A single increment on a legacy record materializes the counter map.
#[tokio::test]
async fn legacy_record_migrates_on_first_reaction() {
    let store = Arc::new(MemoryStore::new());
    store.insert(legacy_record("q1"));
    let service = default_service(store.clone());

    match service.process("q1", "love").await.unwrap() {
        ReactionOutcome::Updated(counters) => {
            assert_eq!(counters, CounterMap::from([("love".to_string(), 1)]));
        }
        other => panic!("expected Updated, got {:?}", other),
    }
}

/// M concurrent increments racing the migration each apply exactly once,
/// whichever call wins the race.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn migration_race_loses_no_increment() {
    let names = ["laugh", "love", "fire"];
    let m = 30;

    let store = Arc::new(MemoryStore::new());
    store.insert(legacy_record("q1"));
    let service = default_service(store.clone());

    let mut handles = Vec::with_capacity(m);
    for i in 0..m {
        let service = service.clone();
        let name = names[i % names.len()];
        handles.push(tokio::spawn(
            async move { service.process("q1", name).await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = store.get("q1").await.unwrap().unwrap();
    let counters = record.counters.expect("map must exist after migration");
    let total: u64 = counters.values().sum();
    assert_eq!(total, m as u64);
}

/// Crossing the threshold deletes; sitting on it does not; other reactions
/// never delete.
#[tokio::test]
async fn threshold_boundary() {
    let store = Arc::new(MemoryStore::new());
    let mut record = migrated_record("q1");
    record
        .counters
        .as_mut()
        .unwrap()
        .insert("report".to_string(), 9);
    record
        .counters
        .as_mut()
        .unwrap()
        .insert("laugh".to_string(), 500);
    store.insert(record);
    let service = default_service(store.clone());

    // 9 -> 10: kept
    assert!(matches!(
        service.process("q1", "report").await.unwrap(),
        ReactionOutcome::Updated(_)
    ));
    assert!(store.get("q1").await.unwrap().is_some());

    // laugh at 500+ never triggers moderation
    assert!(matches!(
        service.process("q1", "laugh").await.unwrap(),
        ReactionOutcome::Updated(_)
    ));
    assert!(store.get("q1").await.unwrap().is_some());

    // 10 -> 11: deleted
    assert_eq!(
        service.process("q1", "report").await.unwrap(),
        ReactionOutcome::Deleted
    );
    assert!(store.get("q1").await.unwrap().is_none());
}

/// Concurrent callers racing past the threshold: the record ends up gone,
/// at least one caller observes the deletion, and nobody sees an internal
/// error. The second delete of an already-gone record is success.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_threshold_deletion_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let mut record = migrated_record("q1");
    record
        .counters
        .as_mut()
        .unwrap()
        .insert("report".to_string(), 10);
    store.insert(record);
    let service = default_service(store.clone());

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.process("q1", "report").await }
    });
    let second = tokio::spawn({
        let service = service.clone();
        async move { service.process("q1", "report").await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];
    let deleted = results
        .iter()
        .filter(|r| matches!(r, Ok(ReactionOutcome::Deleted)))
        .count();
    assert!(deleted >= 1, "at least one caller must observe the deletion");
    for result in &results {
        match result {
            Ok(ReactionOutcome::Deleted) | Err(ReactionError::NotFound) => {}
            other => panic!("unexpected outcome under deletion race: {:?}", other),
        }
    }
    assert!(store.get("q1").await.unwrap().is_none());

    // Deleting the already-gone record again is still success
    store.delete("q1").await.unwrap();
}

/// Increments touch only the counter map.
#[tokio::test]
async fn increment_preserves_unrelated_fields() {
    let store = Arc::new(MemoryStore::new());
    let mut original = legacy_record("q1");
    original.created_at = 1_700_000_000;
    store.insert(original.clone());
    let service = default_service(store.clone());

    service.process("q1", "fire").await.unwrap();
    service.process("q1", "fire").await.unwrap();

    let after = store.get("q1").await.unwrap().unwrap();
    assert_eq!(after.id, original.id);
    assert_eq!(after.author, original.author);
    assert_eq!(after.quote, original.quote);
    assert_eq!(after.created_at, original.created_at);
    assert_eq!(after.count("fire"), 2);
}

/// The scripted end-to-end scenario: likes accumulate, nine reports keep
/// the record, the tenth removes it.
#[tokio::test]
async fn report_lifecycle_scenario() {
    let store = Arc::new(MemoryStore::new());
    store.insert(legacy_record("q1"));
    let service = default_service(store.clone());

    match service.process("q1", "like").await.unwrap() {
        ReactionOutcome::Updated(counters) => {
            assert_eq!(counters, CounterMap::from([("like".to_string(), 1)]));
        }
        other => panic!("expected Updated, got {:?}", other),
    }
    match service.process("q1", "like").await.unwrap() {
        ReactionOutcome::Updated(counters) => assert_eq!(counters.get("like"), Some(&2)),
        other => panic!("expected Updated, got {:?}", other),
    }

    for i in 1..=9u64 {
        match service.process("q1", "report").await.unwrap() {
            ReactionOutcome::Updated(counters) => {
                assert_eq!(counters.get("report"), Some(&i));
                assert_eq!(counters.get("like"), Some(&2));
            }
            other => panic!("expected Updated at report {}, got {:?}", i, other),
        }
    }
    assert!(store.get("q1").await.unwrap().is_some());

    // The tenth report stays within the threshold (10 is kept), the
    // eleventh would delete; with the default strict > 10 rule the record
    // survives report == 10 and dies at 11.
    assert!(matches!(
        service.process("q1", "report").await.unwrap(),
        ReactionOutcome::Updated(_)
    ));
    assert_eq!(
        service.process("q1", "report").await.unwrap(),
        ReactionOutcome::Deleted
    );

    assert!(store.get("q1").await.unwrap().is_none());
    let err = service.process("q1", "like").await.unwrap_err();
    assert!(matches!(err, ReactionError::NotFound));
}

/// Store whose conditional writes never succeed while the record exists:
/// models pathological contention where every pass loses the race.
struct ContendedStore {
    record: QuoteRecord,
}

#[async_trait]
impl ReactionStore for ContendedStore {
    async fn increment_reaction(&self, _id: &str, _reaction: &str) -> Result<WriteOutcome> {
        Ok(WriteOutcome::Unmet)
    }

    async fn init_counters(&self, _id: &str, _reaction: &str) -> Result<WriteOutcome> {
        Ok(WriteOutcome::Unmet)
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn get(&self, _id: &str) -> Result<Option<QuoteRecord>> {
        Ok(Some(self.record.clone()))
    }
}

/// The race-resolution retry budget is bounded and exhaustion surfaces as
/// a transient error rather than looping forever.
#[tokio::test]
async fn pathological_contention_exhausts_retry_budget() {
    let store = Arc::new(ContendedStore {
        record: migrated_record("q1"),
    });
    let updater = ReactionUpdater::new(store).with_max_retries(2);

    let err = updater.increment("q1", "laugh").await.unwrap_err();
    match err {
        ReactionError::RetryExhausted { attempts } => {
            assert_eq!(attempts, 3);
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
    assert!(ReactionError::RetryExhausted { attempts: 3 }.is_transient());
}
