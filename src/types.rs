//! Error taxonomy for reaction updates
//!
//! All store failures are classified at the store-adapter boundary; nothing
//! is swallowed. Deletion races are normalized to success in the service
//! layer and never appear here.

/// Error type for reaction operations.
#[derive(Debug, thiserror::Error)]
pub enum ReactionError {
    /// The record does not exist (terminal, surfaced as 404)
    #[error("no such record")]
    NotFound,

    /// Store timeout or unavailability; safe to retry with backoff
    #[error("store error: {0}")]
    Store(String),

    /// The migration race could not be resolved within the retry budget
    #[error("counter migration unresolved after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    /// The store returned a shape inconsistent with the data model
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReactionError {
    /// Whether the caller may retry this error.
    ///
    /// A timed-out write is transient but its outcome is unknown: the store
    /// may have applied it. Retrying accepts at-least-once semantics.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReactionError::Store(_) | ReactionError::RetryExhausted { .. }
        )
    }
}

/// Result type alias for reaction operations
pub type Result<T> = std::result::Result<T, ReactionError>;
