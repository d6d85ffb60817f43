//! Observability metrics for the event registry.
//!
//! Counters are updated with relaxed atomics outside the registry lock and
//! can be read at any time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing registry activity.
///
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Triggers that fired
    fired: AtomicU64,
    /// Triggers held back because the interval had not elapsed
    held: AtomicU64,
    /// Triggers on a disabled entry
    disabled_hits: AtomicU64,
    /// Triggers for a new identity rejected because the registry was full
    rejected: AtomicU64,
    /// Reset/force/enable/disable calls on an unregistered identity
    unknown_mutations: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_fired(&self) {
        self.inner.fired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_held(&self) {
        self.inner.held.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disabled_hit(&self) {
        self.inner.disabled_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a capacity rejection and return the previous rejection count.
    pub(crate) fn record_rejected(&self) -> u64 {
        self.inner.rejected.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn record_unknown_mutation(&self) {
        self.inner.unknown_mutations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of triggers that fired.
    pub fn fired(&self) -> u64 {
        self.inner.fired.load(Ordering::Relaxed)
    }

    /// Get the number of triggers held back by their interval.
    pub fn held(&self) -> u64 {
        self.inner.held.load(Ordering::Relaxed)
    }

    /// Get the number of triggers on disabled entries.
    pub fn disabled_hits(&self) -> u64 {
        self.inner.disabled_hits.load(Ordering::Relaxed)
    }

    /// Get the number of new identities rejected for capacity.
    pub fn rejected(&self) -> u64 {
        self.inner.rejected.load(Ordering::Relaxed)
    }

    /// Get the number of mutations aimed at unregistered identities.
    pub fn unknown_mutations(&self) -> u64 {
        self.inner.unknown_mutations.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fired: self.fired(),
            held: self.held(),
            disabled_hits: self.disabled_hits(),
            rejected: self.rejected(),
            unknown_mutations: self.unknown_mutations(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub fired: u64,
    pub held: u64,
    pub disabled_hits: u64,
    pub rejected: u64,
    pub unknown_mutations: u64,
}

impl MetricsSnapshot {
    /// Total number of trigger evaluations, fired or not.
    pub fn total_triggers(&self) -> u64 {
        self.fired
            .saturating_add(self.held)
            .saturating_add(self.disabled_hits)
            .saturating_add(self.rejected)
    }

    /// Fraction of triggers that fired (0.0 to 1.0).
    ///
    /// Returns 0.0 if no triggers were evaluated.
    pub fn fire_rate(&self) -> f64 {
        let total = self.total_triggers();
        if total == 0 {
            0.0
        } else {
            self.fired as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_rejected_returns_previous() {
        let metrics = Metrics::new();
        assert_eq!(metrics.record_rejected(), 0);
        assert_eq!(metrics.record_rejected(), 1);
        assert_eq!(metrics.rejected(), 2);
    }

    #[test]
    fn test_snapshot_rates() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().fire_rate(), 0.0);

        metrics.record_fired();
        metrics.record_held();
        metrics.record_held();
        metrics.record_disabled_hit();
        metrics.record_unknown_mutation();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_triggers(), 4);
        assert!((snapshot.fire_rate() - 0.25).abs() < f64::EPSILON);
        assert_eq!(snapshot.unknown_mutations, 1);
    }

    #[test]
    fn test_metrics_clone_shares_counters() {
        let metrics1 = Metrics::new();
        metrics1.record_fired();

        let metrics2 = metrics1.clone();
        metrics2.record_fired();

        assert_eq!(metrics1.fired(), 2);
        assert_eq!(metrics2.fired(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_fired();
                    m.record_held();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.fired(), 1000);
        assert_eq!(metrics.held(), 1000);
    }
}
