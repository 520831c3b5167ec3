//! Orchestration of increment, moderation, and deletion

use std::sync::Arc;

use tracing::info;

use super::moderation::{Decision, ModerationPolicy};
use super::updater::ReactionUpdater;
use crate::model::CounterMap;
use crate::store::ReactionStore;
use crate::types::Result;

/// Result of processing one reaction
#[derive(Debug, Clone, PartialEq)]
pub enum ReactionOutcome {
    /// The increment applied; carries the full post-increment counter map
    Updated(CounterMap),
    /// The moderated reaction crossed its threshold and the record was removed
    Deleted,
}

/// Applies a reaction to a record and enforces the moderation policy.
pub struct ReactionService {
    updater: ReactionUpdater,
    policy: ModerationPolicy,
    store: Arc<dyn ReactionStore>,
}

impl ReactionService {
    pub fn new(store: Arc<dyn ReactionStore>, policy: ModerationPolicy) -> Self {
        Self {
            updater: ReactionUpdater::new(store.clone()),
            policy,
            store,
        }
    }

    /// Override the updater's migration-race retry cap.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.updater = self.updater.with_max_retries(max_retries);
        self
    }

    /// Process one reaction: increment, then evaluate moderation when the
    /// incremented reaction is the moderated one.
    ///
    /// Deletion is best-effort and idempotent: a concurrent caller crossing
    /// the threshold first may already have removed the record, and that
    /// still counts as `Deleted` here.
    pub async fn process(&self, id: &str, reaction: &str) -> Result<ReactionOutcome> {
        let counters = self.updater.increment(id, reaction).await?;

        if self.policy.applies_to(reaction) && self.policy.evaluate(&counters) == Decision::Delete {
            self.store.delete(id).await?;
            info!(
                record = id,
                reaction,
                count = counters.get(reaction).copied().unwrap_or(0),
                "record removed by moderation policy"
            );
            return Ok(ReactionOutcome::Deleted);
        }

        Ok(ReactionOutcome::Updated(counters))
    }
}
