//! Reputation store contract and the in-memory backend
//!
//! Increments are additive merges performed inside the store. Callers never
//! read-modify-write a counter, so concurrent scans of the same network
//! cannot lose updates.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::crypto::Fingerprint;
use crate::error::ScanResult;
use crate::reputation::stats::{ReputationCounter, ReputationStats};

#[async_trait]
pub trait ReputationStore: Send + Sync {
    /// Current stats, or [`ReputationStats::UNSEEN`] for an unknown fingerprint.
    /// Backend failures are errors, never a zero default.
    async fn get(&self, fingerprint: &Fingerprint) -> ScanResult<ReputationStats>;

    /// Atomically add one observation (`seen += 1`, `high += is_high`)
    async fn increment(&self, fingerprint: &Fingerprint, is_high: bool) -> ScanResult<()>;
}

/// Process-local store backed by a sharded concurrent map
#[derive(Debug, Default)]
pub struct InMemoryReputationStore {
    counters: DashMap<Fingerprint, ReputationStats>,
}

impl InMemoryReputationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Snapshot of every counter, ordered by fingerprint
    pub fn counters(&self) -> Vec<ReputationCounter> {
        let mut counters: Vec<ReputationCounter> = self
            .counters
            .iter()
            .map(|entry| ReputationCounter {
                fingerprint: entry.key().clone(),
                seen: entry.value().seen,
                high: entry.value().high,
            })
            .collect();
        counters.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        counters
    }
}

#[async_trait]
impl ReputationStore for InMemoryReputationStore {
    async fn get(&self, fingerprint: &Fingerprint) -> ScanResult<ReputationStats> {
        Ok(self
            .counters
            .get(fingerprint)
            .map(|entry| *entry.value())
            .unwrap_or(ReputationStats::UNSEEN))
    }

    async fn increment(&self, fingerprint: &Fingerprint, is_high: bool) -> ScanResult<()> {
        // The entry guard holds the shard lock for the whole update
        let mut entry = self.counters.entry(fingerprint.clone()).or_default();
        entry.record(is_high);
        debug!(
            fingerprint = %fingerprint,
            seen = entry.seen,
            high = entry.high,
            "Reputation incremented"
        );
        Ok(())
    }
}
