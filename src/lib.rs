//! Quipboard - reaction counters for the quote feed
//!
//! Applies named reaction increments to quote records held in an external
//! document store, migrating legacy records that predate the counter map,
//! and removes records once the moderated reaction crosses its threshold.
//!
//! ## Components
//!
//! - **Store**: injected [`store::ReactionStore`] with four per-key atomic
//!   primitives (MongoDB in production, in-memory in tests and dev mode)
//! - **Updater**: two-phase conditional increment with bounded race retry
//! - **Moderation**: threshold policy over the post-increment counters
//! - **Server**: thin axum surface exposing the reaction operation

pub mod config;
pub mod model;
pub mod reaction;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use reaction::{ModerationPolicy, ReactionOutcome, ReactionService};
pub use types::{ReactionError, Result};
