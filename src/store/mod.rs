//! Store abstraction for quote records
//!
//! The reaction core never talks to a vendor client directly; it sees only
//! this trait, with exactly the four per-key atomic primitives the protocol
//! needs. [`mongo::MongoStore`] backs production, [`memory::MemoryStore`]
//! backs tests and dev mode.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::model::{CounterMap, QuoteRecord};
use crate::types::Result;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Outcome of a conditional write against one record.
///
/// `Unmet` means the precondition did not hold and nothing was written; it
/// does not distinguish "record absent" from "condition failed" - the
/// updater resolves that with a point lookup when both phases miss.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The precondition held; carries the post-update counter map from the
    /// same atomic operation, never from a separate read.
    Applied(CounterMap),
    /// The precondition did not hold; the record is unchanged.
    Unmet,
}

/// Per-key atomic primitives over quote records.
///
/// Implementations must make each method atomic and linearizable with
/// respect to other calls on the same record key. No coordination across
/// keys is required.
#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// Add 1 to `counters[reaction]`, conditioned on the counter map
    /// already existing on the record.
    async fn increment_reaction(&self, id: &str, reaction: &str) -> Result<WriteOutcome>;

    /// Set `counters = {reaction: 1}`, conditioned on the counter map being
    /// absent from the record.
    async fn init_counters(&self, id: &str, reaction: &str) -> Result<WriteOutcome>;

    /// Delete the record. Deleting an absent record is success.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Point lookup by record key.
    async fn get(&self, id: &str) -> Result<Option<QuoteRecord>>;
}
