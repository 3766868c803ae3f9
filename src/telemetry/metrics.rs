//! Counters for reconciliation-pass statistics.
//!
//! Observational only; the rewrite rules behave identically whether or not
//! counters are attached.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds a value to the counter.
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Gets the current value of the counter.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Statistics for NAT reconciliation passes.
#[derive(Debug, Default)]
pub struct NatStats {
    /// Connection-tracking records walked.
    pub flows_walked: Counter,
    /// Records skipped because the observed endpoint was not in the report.
    pub flows_skipped: Counter,
    /// Adjacency entries replaced by destination-NAT correction.
    pub destinations_rewritten: Counter,
    /// Provenance copies created by source-NAT correction.
    pub copies_added: Counter,
    /// Rewritten artifact nodes deleted after their adjacency emptied.
    pub nodes_removed: Counter,
}

impl NatStats {
    /// Creates new statistics initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_inc_and_add() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.add(4);
        assert_eq!(counter.get(), 5);
    }

    #[test]
    fn test_nat_stats_start_at_zero() {
        let stats = NatStats::new();
        assert_eq!(stats.flows_walked.get(), 0);
        assert_eq!(stats.nodes_removed.get(), 0);
    }
}
