//! Reputation counters and the policy that reads them
//!
//! A counter tracks how many scans were seen for a fingerprint and how many
//! of those were labeled HIGH. An unknown fingerprint has `seen = high = 0`.

use serde::{Deserialize, Serialize};

use crate::crypto::Fingerprint;

/// Aggregate stats for one fingerprint. Invariant: `high <= seen`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationStats {
    pub seen: u64,
    pub high: u64,
}

impl ReputationStats {
    /// Stats for a fingerprint that has never been recorded
    pub const UNSEEN: ReputationStats = ReputationStats { seen: 0, high: 0 };

    pub fn new(seen: u64, high: u64) -> Self {
        debug_assert!(high <= seen, "high ({}) exceeds seen ({})", high, seen);
        Self { seen, high }
    }

    /// Share of scans labeled HIGH (0.0 when never seen)
    pub fn high_rate(&self) -> f64 {
        if self.seen == 0 {
            return 0.0;
        }
        self.high as f64 / self.seen as f64
    }

    /// High rate rounded to three decimals for API responses
    pub fn rounded_high_rate(&self) -> f64 {
        (self.high_rate() * 1000.0).round() / 1000.0
    }

    /// Apply one observation
    pub fn record(&mut self, is_high: bool) {
        self.seen += 1;
        if is_high {
            self.high += 1;
        }
    }
}

/// Persisted counter row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationCounter {
    pub fingerprint: Fingerprint,
    pub seen: u64,
    pub high: u64,
}

impl ReputationCounter {
    pub fn stats(&self) -> ReputationStats {
        ReputationStats {
            seen: self.seen,
            high: self.high,
        }
    }
}

/// Thresholds for the community reputation penalty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationPolicy {
    /// Minimum observations before reputation is trusted
    pub min_seen: u64,
    /// Minimum HIGH share that marks a network as bad
    pub min_high_rate: f64,
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            min_seen: 30,
            min_high_rate: 0.30,
        }
    }
}

impl ReputationPolicy {
    pub fn is_bad(&self, stats: &ReputationStats) -> bool {
        stats.seen >= self.min_seen && stats.high_rate() >= self.min_high_rate
    }
}
