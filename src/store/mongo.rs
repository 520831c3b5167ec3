//! MongoDB store adapter
//!
//! Maps the four reaction primitives onto single-document conditional
//! updates. `$exists` guards in the filter carry the precondition, and
//! `ReturnDocument::After` returns the post-update counters from the same
//! atomic operation. MongoDB serializes writes per document, which gives
//! the linearizable-per-key semantics the trait requires.

use bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use tracing::info;

use async_trait::async_trait;

use super::{ReactionStore, WriteOutcome};
use crate::model::QuoteRecord;
use crate::types::{ReactionError, Result};

/// Server error code returned when `$inc` hits a non-numeric stored value
const TYPE_MISMATCH: i32 = 14;

/// MongoDB-backed record store
#[derive(Clone)]
pub struct MongoStore {
    records: Collection<QuoteRecord>,
}

impl MongoStore {
    /// Connect and verify reachability with a ping.
    ///
    /// `timeout_ms` bounds server selection and connect time so startup
    /// fails fast instead of hanging on an unreachable MongoDB.
    pub async fn connect(
        uri: &str,
        db_name: &str,
        collection: &str,
        timeout_ms: u64,
    ) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        let sep = if uri.contains('?') { '&' } else { '?' };
        let timeout_uri = format!(
            "{}{}serverSelectionTimeoutMS={}&connectTimeoutMS={}",
            uri, sep, timeout_ms, timeout_ms
        );

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| ReactionError::Store(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ReactionError::Store(format!("MongoDB ping failed: {}", e)))?;

        info!(
            "Connected to MongoDB database '{}', collection '{}'",
            db_name, collection
        );

        Ok(Self {
            records: client.database(db_name).collection(collection),
        })
    }

    /// Classify a driver error at the adapter boundary.
    ///
    /// A document that no longer decodes as a `QuoteRecord`, or a `$inc`
    /// rejected by the server because the stored counter value is not a
    /// number (TypeMismatch, code 14), is an invariant violation rather
    /// than a transient failure; everything else is retriable store I/O.
    fn classify(context: &str, e: mongodb::error::Error) -> ReactionError {
        match *e.kind {
            ErrorKind::BsonDeserialization(ref de) => {
                ReactionError::Invariant(format!("{}: undecodable record: {}", context, de))
            }
            ErrorKind::Command(ref c) if c.code == TYPE_MISMATCH => ReactionError::Invariant(
                format!("{}: non-numeric counter value: {}", context, c.message),
            ),
            ErrorKind::Write(WriteFailure::WriteError(ref w)) if w.code == TYPE_MISMATCH => {
                ReactionError::Invariant(format!(
                    "{}: non-numeric counter value: {}",
                    context, w.message
                ))
            }
            _ => ReactionError::Store(format!("{}: {}", context, e)),
        }
    }
}

#[async_trait]
impl ReactionStore for MongoStore {
    async fn increment_reaction(&self, id: &str, reaction: &str) -> Result<WriteOutcome> {
        let filter = doc! { "_id": id, "counters": { "$exists": true } };
        let update = doc! { "$inc": { format!("counters.{}", reaction): 1_i64 } };

        let updated = self
            .records
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| Self::classify("increment", e))?;

        match updated {
            Some(record) => {
                let counters = record.counters.ok_or_else(|| {
                    ReactionError::Invariant(format!(
                        "record '{}' matched the counters guard but has none",
                        id
                    ))
                })?;
                Ok(WriteOutcome::Applied(counters))
            }
            None => Ok(WriteOutcome::Unmet),
        }
    }

    async fn init_counters(&self, id: &str, reaction: &str) -> Result<WriteOutcome> {
        let filter = doc! { "_id": id, "counters": { "$exists": false } };
        let update = doc! { "$set": { "counters": { reaction: 1_i64 } } };

        let updated = self
            .records
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| Self::classify("init counters", e))?;

        match updated {
            Some(record) => {
                let counters = record.counters.ok_or_else(|| {
                    ReactionError::Invariant(format!(
                        "record '{}' lost its counter map right after migration",
                        id
                    ))
                })?;
                Ok(WriteOutcome::Applied(counters))
            }
            None => Ok(WriteOutcome::Unmet),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // deleted_count of zero means another caller got there first,
        // which the protocol treats as success
        self.records
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| Self::classify("delete", e))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<QuoteRecord>> {
        self.records
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| Self::classify("lookup", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Conditional-write semantics are covered against MemoryStore, which
    // mirrors this adapter; exercising the collection calls themselves
    // needs a running MongoDB. Error classification is testable offline
    // with the error kinds constructible outside the driver; the
    // TypeMismatch arms (CommandError/WriteError are non-exhaustive
    // structs) are only reachable against a live server.

    #[test]
    fn test_undecodable_record_is_invariant_violation() {
        let de = <bson::de::Error as serde::de::Error>::custom("counters is a string");
        let err = MongoStore::classify("increment", mongodb::error::Error::from(de));
        match err {
            ReactionError::Invariant(message) => assert!(message.contains("increment")),
            other => panic!("expected Invariant, got {:?}", other),
        }
    }

    #[test]
    fn test_io_failure_is_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = MongoStore::classify("lookup", mongodb::error::Error::from(io));
        assert!(err.is_transient());
    }
}
