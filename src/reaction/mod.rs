//! Reaction core: updater, moderation policy, and orchestration

pub mod moderation;
pub mod service;
pub mod updater;

pub use moderation::{Decision, ModerationPolicy};
pub use service::{ReactionOutcome, ReactionService};
pub use updater::ReactionUpdater;
