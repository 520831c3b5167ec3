//! Moderation policy over post-increment counters

use crate::model::CounterMap;

/// Default threshold above which the moderated reaction removes a record
pub const DEFAULT_REPORT_THRESHOLD: u64 = 10;

/// Default name of the moderated reaction
pub const DEFAULT_MODERATED_REACTION: &str = "report";

/// Moderation verdict for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Delete,
}

/// Deletes a record once its moderated reaction strictly exceeds the
/// threshold. Only evaluated after increments of the moderated reaction;
/// other reactions never trigger it, whatever their count.
#[derive(Debug, Clone)]
pub struct ModerationPolicy {
    report_threshold: u64,
    moderated_reaction: String,
}

impl ModerationPolicy {
    pub fn new(report_threshold: u64, moderated_reaction: impl Into<String>) -> Self {
        Self {
            report_threshold,
            moderated_reaction: moderated_reaction.into(),
        }
    }

    /// Name of the reaction this policy watches
    pub fn moderated_reaction(&self) -> &str {
        &self.moderated_reaction
    }

    /// Whether an increment of `reaction` warrants evaluation
    pub fn applies_to(&self, reaction: &str) -> bool {
        reaction == self.moderated_reaction
    }

    /// Judge the post-increment counter state.
    pub fn evaluate(&self, counters: &CounterMap) -> Decision {
        let count = counters
            .get(self.moderated_reaction.as_str())
            .copied()
            .unwrap_or(0);
        if count > self.report_threshold {
            Decision::Delete
        } else {
            Decision::Keep
        }
    }
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_THRESHOLD, DEFAULT_MODERATED_REACTION)
    }
}
