//! Two-phase conditional reaction increment
//!
//! Records written before the schema change have no counter map, so one
//! logical increment is driven through up to three store states:
//!
//! 1. fast path - atomic `+1`, guarded on the counter map existing
//! 2. migration path - atomic `set {reaction: 1}`, guarded on it being absent
//! 3. race resolution - both guards missed: either the record is gone, or a
//!    concurrent caller created the map between the two writes and the fast
//!    path will succeed on the next pass
//!
//! The migration path and the fast path are mutually exclusive outcomes of
//! the same logical increment; exactly one of them applies per call.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::CounterMap;
use crate::store::{ReactionStore, WriteOutcome};
use crate::types::{ReactionError, Result};

/// Default cap on migration-race retries
pub const DEFAULT_MAX_MIGRATION_RETRIES: u32 = 3;

/// Applies one named counter increment to one record.
pub struct ReactionUpdater {
    store: Arc<dyn ReactionStore>,
    max_retries: u32,
}

impl ReactionUpdater {
    pub fn new(store: Arc<dyn ReactionStore>) -> Self {
        Self {
            store,
            max_retries: DEFAULT_MAX_MIGRATION_RETRIES,
        }
    }

    /// Override the migration-race retry cap.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Apply exactly one increment to `counters[reaction]` on the record,
    /// migrating a legacy record to the counter-map shape if needed.
    ///
    /// Returns the full post-increment counter map.
    pub async fn increment(&self, id: &str, reaction: &str) -> Result<CounterMap> {
        let mut attempts: u32 = 0;
        loop {
            // Fast path: one round trip for any record whose map exists
            if let WriteOutcome::Applied(counters) =
                self.store.increment_reaction(id, reaction).await?
            {
                return Ok(counters);
            }

            // Migration path: seed the map with this increment
            if let WriteOutcome::Applied(counters) = self.store.init_counters(id, reaction).await? {
                debug!(record = id, reaction, "migrated legacy record to counter map");
                return Ok(counters);
            }

            // Both guards missed. Distinguish "record absent" from "lost
            // the migration race" with a point lookup.
            if self.store.get(id).await?.is_none() {
                return Err(ReactionError::NotFound);
            }

            attempts += 1;
            if attempts > self.max_retries {
                warn!(record = id, attempts, "migration race retry budget exhausted");
                return Err(ReactionError::RetryExhausted { attempts });
            }
            // Another caller created the map first; retry the fast path.
            debug!(record = id, attempt = attempts, "lost migration race, retrying");
        }
    }
}
