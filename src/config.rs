//! Configuration for Quipboard
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

use crate::model::validate_reaction_name;
use crate::reaction::ModerationPolicy;

/// Quipboard - reaction counters for the quote feed
#[derive(Parser, Debug, Clone)]
#[command(name = "quipboard")]
#[command(about = "Reaction counter service for the quipboard quote feed")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "quipboard")]
    pub mongodb_db: String,

    /// Collection holding quote records
    #[arg(long, env = "MONGODB_COLLECTION", default_value = "messages")]
    pub mongodb_collection: String,

    /// Report count above which a record is removed (strictly greater-than)
    #[arg(long, env = "REPORT_THRESHOLD", default_value = "10")]
    pub report_threshold: u64,

    /// Name of the reaction watched by the moderation policy
    #[arg(long, env = "MODERATED_REACTION", default_value = "report")]
    pub moderated_reaction: String,

    /// Cap on migration-race retries before surfacing a transient error
    #[arg(long, env = "MAX_MIGRATION_RETRIES", default_value = "3")]
    pub max_migration_retries: u32,

    /// Store round-trip timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "3000")]
    pub request_timeout_ms: u64,

    /// Enable development mode (in-memory store, no MongoDB required)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Build the moderation policy from configuration
    pub fn moderation_policy(&self) -> ModerationPolicy {
        ModerationPolicy::new(self.report_threshold, self.moderated_reaction.clone())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_reaction_name(&self.moderated_reaction)
            .map_err(|e| format!("MODERATED_REACTION: {}", e))?;

        if self.max_migration_retries == 0 {
            return Err("MAX_MIGRATION_RETRIES must be at least 1".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        Ok(())
    }
}
