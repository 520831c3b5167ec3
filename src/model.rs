//! Quote record schema
//!
//! The persisted unit the reaction core updates. Records created before the
//! counter map existed in the schema have no `counters` field; the updater
//! materializes it on first reaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mapping from reaction name to count. A name not present is implicitly zero.
pub type CounterMap = HashMap<String, u64>;

/// Maximum accepted length of a reaction name
pub const MAX_REACTION_NAME_LEN: usize = 64;

/// Quote record stored in the messages collection
///
/// Every field other than `counters` is opaque to the reaction core and is
/// preserved untouched by updates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuoteRecord {
    /// Opaque record key, assigned at creation (outside this core)
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name of the person the quote is about
    #[serde(default = "default_author")]
    pub author: String,

    /// The quote text
    #[serde(default)]
    pub quote: String,

    /// Creation time, epoch seconds
    #[serde(default)]
    pub created_at: i64,

    /// Reaction counts. Absent on legacy records until first reaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counters: Option<CounterMap>,
}

fn default_author() -> String {
    "Unknown".to_string()
}

impl QuoteRecord {
    /// Create a record with an already-materialized (empty) counter map
    pub fn new(id: impl Into<String>, author: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            quote: quote.into(),
            created_at: 0,
            counters: Some(CounterMap::new()),
        }
    }

    /// Create a record without a counter map, as written before the schema change
    pub fn legacy(
        id: impl Into<String>,
        author: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            counters: None,
            ..Self::new(id, author, quote)
        }
    }

    /// Current count for a reaction name (zero when absent)
    pub fn count(&self, reaction: &str) -> u64 {
        self.counters
            .as_ref()
            .and_then(|c| c.get(reaction).copied())
            .unwrap_or(0)
    }
}

/// Shape-validate a caller-supplied reaction name.
///
/// The updater enforces no fixed name set; this only rejects names that
/// cannot safely be embedded in a store field path.
pub fn validate_reaction_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("reaction name must not be empty".to_string());
    }
    if name.len() > MAX_REACTION_NAME_LEN {
        return Err(format!(
            "reaction name exceeds {} characters",
            MAX_REACTION_NAME_LEN
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("reaction name must match [A-Za-z0-9_-]".to_string());
    }
    Ok(())
}
