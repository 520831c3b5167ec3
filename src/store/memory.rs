//! In-memory store for tests and dev mode
//!
//! Mirrors the conditional semantics of the MongoDB adapter. DashMap entry
//! guards hold a shard lock for the duration of each mutation, which gives
//! the per-record atomicity the trait requires.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{ReactionStore, WriteOutcome};
use crate::model::{CounterMap, QuoteRecord};
use crate::types::{ReactionError, Result};

/// In-memory record store keyed by record id
pub struct MemoryStore {
    records: DashMap<String, QuoteRecord>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Seed a record (record creation itself is outside the reaction core)
    pub fn insert(&self, record: QuoteRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// Toggle availability; while unavailable every operation fails with a
    /// transient store error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ReactionError::Store("memory store offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReactionStore for MemoryStore {
    async fn increment_reaction(&self, id: &str, reaction: &str) -> Result<WriteOutcome> {
        self.check_available()?;
        match self.records.get_mut(id) {
            // Absent record: the precondition cannot hold
            None => Ok(WriteOutcome::Unmet),
            Some(mut record) => match record.counters.as_mut() {
                None => Ok(WriteOutcome::Unmet),
                Some(counters) => {
                    *counters.entry(reaction.to_string()).or_insert(0) += 1;
                    Ok(WriteOutcome::Applied(counters.clone()))
                }
            },
        }
    }

    async fn init_counters(&self, id: &str, reaction: &str) -> Result<WriteOutcome> {
        self.check_available()?;
        match self.records.get_mut(id) {
            None => Ok(WriteOutcome::Unmet),
            Some(mut record) => {
                if record.counters.is_some() {
                    return Ok(WriteOutcome::Unmet);
                }
                let counters = CounterMap::from([(reaction.to_string(), 1)]);
                record.counters = Some(counters.clone());
                Ok(WriteOutcome::Applied(counters))
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_available()?;
        self.records.remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<QuoteRecord>> {
        self.check_available()?;
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }
}
