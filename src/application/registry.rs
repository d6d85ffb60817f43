//! Central registry of call-site events.
//!
//! The registry maps event identities to their entries, bounded by a fixed
//! capacity. Every operation runs as one critical section of the storage
//! lock; diagnostics and metrics are recorded after the lock is released.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::{
    entry::{EntryState, EventEntry},
    identity::{CallSite, EventId},
    outcome::TriggerResult,
};
use crate::infrastructure::builder::SharedStorage;
use std::fmt;
use std::sync::Arc;

/// What a trigger evaluation did, decided under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evaluation {
    Fired,
    Held,
    Disabled,
    Rejected,
}

/// Bounded, lock-guarded registry of rate-limited events.
///
/// Clones share the same storage and metrics, so one registry can be handed
/// to every call site of an application.
///
/// This type is generic over the storage implementation. In production, use
/// the default `Arc<LockedStorage>` built by [`EventRegistry::builder`].
#[derive(Clone)]
pub struct EventRegistry<S = SharedStorage>
where
    S: Storage<EventId, EventEntry>,
{
    storage: S,
    clock: Arc<dyn Clock>,
    capacity: usize,
    metrics: Metrics,
}

impl<S> EventRegistry<S>
where
    S: Storage<EventId, EventEntry>,
{
    /// Create a registry over a storage backend and clock.
    ///
    /// `capacity` bounds the number of distinct identities ever registered.
    pub fn with_storage(storage: S, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            storage,
            clock,
            capacity,
            metrics: Metrics::new(),
        }
    }

    /// Evaluate the event at `site` against `interval_ms`.
    ///
    /// The first admitted trigger for an identity registers it and records
    /// `site` as its origin. The event fires when it never fired before or
    /// when strictly more than `interval_ms` milliseconds passed since its
    /// last fire. A disabled event never fires. A new identity arriving at a
    /// full registry is not registered and does not fire.
    pub fn trigger(&self, interval_ms: u64, site: CallSite) -> TriggerResult {
        let id = site.id();
        let fired = self.evaluate(interval_ms, id, Some(&site));
        TriggerResult::new(fired, id)
    }

    /// Evaluate an event by identity. Entries created here have no origin.
    pub fn trigger_id(&self, interval_ms: u64, id: EventId) -> bool {
        self.evaluate(interval_ms, id, None)
    }

    fn evaluate(&self, interval_ms: u64, id: EventId, site: Option<&CallSite>) -> bool {
        let now = self.clock.now_millis();

        let evaluation = self
            .storage
            .with_entry_bounded(
                id,
                self.capacity,
                || EventEntry::new(site.cloned()),
                |entry| {
                    if !entry.enabled {
                        Evaluation::Disabled
                    } else if entry.try_fire(now, interval_ms) {
                        Evaluation::Fired
                    } else {
                        Evaluation::Held
                    }
                },
            )
            .unwrap_or(Evaluation::Rejected);

        let path = site.map(CallSite::path);
        let line = site.map(CallSite::line);

        match evaluation {
            Evaluation::Fired => {
                self.metrics.record_fired();
                tracing::debug!(id = %id, path, line, "event fired");
                true
            }
            Evaluation::Held => {
                self.metrics.record_held();
                false
            }
            Evaluation::Disabled => {
                self.metrics.record_disabled_hit();
                tracing::trace!(id = %id, path, line, "event disabled");
                false
            }
            Evaluation::Rejected => {
                // Warn once; a full registry in a polling loop would flood the sink
                if self.metrics.record_rejected() == 0 {
                    tracing::warn!(
                        id = %id,
                        capacity = self.capacity,
                        path,
                        line,
                        "event registry full, new event not registered; consider a larger capacity"
                    );
                } else {
                    tracing::debug!(
                        id = %id,
                        capacity = self.capacity,
                        path,
                        line,
                        "event registry full, new event not registered"
                    );
                }
                false
            }
        }
    }

    /// Mark the event as if it just fired, delaying the next fire by a full
    /// interval.
    ///
    /// Returns `false` and changes nothing if the identity is not registered.
    pub fn reset(&self, id: EventId) -> bool {
        let now = self.clock.now_millis();
        self.with_registered(id, "reset", |entry| entry.reset(now))
    }

    /// Make the next trigger of the event fire regardless of its interval.
    ///
    /// Returns `false` and changes nothing if the identity is not registered.
    pub fn force(&self, id: EventId) -> bool {
        self.with_registered(id, "force", EventEntry::force)
    }

    /// Re-enable interval evaluation, resuming from the recorded last fire.
    ///
    /// Returns `false` and changes nothing if the identity is not registered.
    pub fn enable(&self, id: EventId) -> bool {
        self.with_registered(id, "enable", |entry| entry.enabled = true)
    }

    /// Stop the event from firing until it is enabled again.
    ///
    /// The last fire timestamp is kept. Returns `false` and changes nothing
    /// if the identity is not registered.
    pub fn disable(&self, id: EventId) -> bool {
        self.with_registered(id, "disable", |entry| entry.enabled = false)
    }

    /// Apply `mutation` to a registered entry. Unknown identities are never
    /// registered here.
    fn with_registered<F>(&self, id: EventId, operation: &'static str, mutation: F) -> bool
    where
        F: FnOnce(&mut EventEntry),
    {
        let found = self.storage.with_existing_mut(&id, mutation).is_some();
        if !found {
            self.metrics.record_unknown_mutation();
            tracing::debug!(id = %id, operation, "ignoring operation on unregistered event");
        }
        found
    }

    /// Lifecycle state of an identity.
    pub fn state(&self, id: EventId) -> EntryState {
        self.storage
            .with_existing(&id, EventEntry::state)
            .unwrap_or(EntryState::Unregistered)
    }

    /// Copy of the entry for an identity, if registered.
    pub fn inspect(&self, id: EventId) -> Option<EventEntry> {
        self.storage.with_existing(&id, EventEntry::clone)
    }

    /// Copies of all registered entries, ordered by identity.
    pub fn snapshot(&self) -> Vec<(EventId, EventEntry)> {
        let mut entries = Vec::with_capacity(self.storage.len());
        self.storage
            .for_each(|id, entry| entries.push((*id, entry.clone())));
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    /// Get the number of registered identities.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no identity is registered.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Maximum number of distinct identities.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<S> fmt::Debug for EventRegistry<S>
where
    S: Storage<EventId, EventEntry>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::LockedStorage;

    fn registry(capacity: usize) -> (EventRegistry, MockClock) {
        let clock = MockClock::new(0);
        let storage = Arc::new(LockedStorage::new());
        let registry = EventRegistry::with_storage(storage, Arc::new(clock.clone()), capacity);
        (registry, clock)
    }

    fn site(line: u32) -> CallSite {
        CallSite::new("src/app.rs", line)
    }

    #[test]
    fn test_registry_creation() {
        let (registry, _clock) = registry(64);
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.capacity(), 64);
    }

    #[test]
    fn test_interval_scenario() {
        let (registry, clock) = registry(64);

        assert!(registry.trigger(100, site(1)).fired);
        clock.set(50);
        assert!(!registry.trigger(100, site(1)).fired);
        clock.set(150);
        assert!(registry.trigger(100, site(1)).fired);
    }

    #[test]
    fn test_trigger_result_identity() {
        let (registry, _clock) = registry(64);
        let result = registry.trigger(10, site(5));
        assert_eq!(result.id, EventId::derive("src/app.rs", 5));
        assert_eq!(registry.state(result.id), EntryState::Active);
    }

    #[test]
    fn test_origin_recorded_once() {
        let (registry, _clock) = registry(64);

        // "a":1 and "":98 derive the same identity
        let first = registry.trigger(10, CallSite::new("a", 1));
        let second = registry.trigger(10, CallSite::new("", 98));
        assert_eq!(first.id, second.id);

        let entry = registry.inspect(first.id).unwrap();
        assert_eq!(entry.origin, Some(CallSite::new("a", 1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_trigger_id_has_no_origin() {
        let (registry, _clock) = registry(64);
        let id = EventId::from_raw(99);

        assert!(registry.trigger_id(10, id));
        assert_eq!(registry.inspect(id).unwrap().origin, None);
    }

    #[test]
    fn test_capacity_rejects_new_identity() {
        let (registry, _clock) = registry(2);

        assert!(registry.trigger(10, site(1)).fired);
        assert!(registry.trigger(10, site(2)).fired);

        let rejected = registry.trigger(10, site(3));
        assert!(!rejected.fired);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.state(rejected.id), EntryState::Unregistered);
        assert_eq!(registry.metrics().rejected(), 1);
    }

    #[test]
    fn test_registered_identity_evaluated_when_full() {
        let (registry, clock) = registry(1);

        assert!(registry.trigger(10, site(1)).fired);
        assert!(!registry.trigger(10, site(2)).fired);

        clock.set(11);
        assert!(registry.trigger(10, site(1)).fired);
    }

    #[test]
    fn test_disable_and_enable() {
        let (registry, clock) = registry(64);
        let id = registry.trigger(100, site(1)).id;

        assert!(registry.disable(id));
        assert_eq!(registry.state(id), EntryState::Inactive);

        clock.set(10_000);
        for _ in 0..5 {
            assert!(!registry.trigger(100, site(1)).fired);
        }
        assert_eq!(registry.inspect(id).unwrap().last_fired, Some(0));

        assert!(registry.enable(id));
        assert_eq!(registry.state(id), EntryState::Active);
        assert!(registry.trigger(100, site(1)).fired);
        assert_eq!(registry.metrics().disabled_hits(), 5);
    }

    #[test]
    fn test_reenable_resumes_from_last_fire() {
        let (registry, clock) = registry(64);
        let id = registry.trigger(100, site(1)).id;

        registry.disable(id);
        clock.set(50);
        registry.enable(id);

        assert!(!registry.trigger(100, site(1)).fired);
    }

    #[test]
    fn test_reset_delays_next_fire() {
        let (registry, clock) = registry(64);
        let id = registry.trigger(100, site(1)).id;

        clock.set(90);
        assert!(registry.reset(id));

        clock.set(150);
        assert!(!registry.trigger(100, site(1)).fired);

        clock.set(191);
        assert!(registry.trigger(100, site(1)).fired);
    }

    #[test]
    fn test_force_fires_next_trigger() {
        let (registry, clock) = registry(64);
        let id = registry.trigger(1_000, site(1)).id;

        clock.set(1);
        assert!(registry.force(id));
        assert!(registry.trigger(1_000, site(1)).fired);
        assert!(!registry.trigger(1_000, site(1)).fired);
    }

    #[test]
    fn test_force_keeps_disabled() {
        let (registry, _clock) = registry(64);
        let id = registry.trigger(1_000, site(1)).id;

        registry.disable(id);
        registry.force(id);
        assert!(!registry.trigger(1_000, site(1)).fired);
        assert_eq!(registry.state(id), EntryState::Inactive);
    }

    #[test]
    fn test_mutators_never_register() {
        let (registry, _clock) = registry(64);
        let id = EventId::derive("src/app.rs", 1);

        assert!(!registry.reset(id));
        assert!(!registry.force(id));
        assert!(!registry.enable(id));
        assert!(!registry.disable(id));

        assert!(registry.is_empty());
        assert_eq!(registry.state(id), EntryState::Unregistered);
        assert_eq!(registry.metrics().unknown_mutations(), 4);

        // A disable before the first trigger has no lasting effect
        assert!(registry.trigger(10, site(1)).fired);
    }

    #[test]
    fn test_snapshot_sorted() {
        let (registry, _clock) = registry(64);
        for line in [30, 10, 20] {
            let _ = registry.trigger(10, site(line));
        }

        let ids: Vec<_> = registry.snapshot().into_iter().map(|(id, _)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let (registry, _clock) = registry(64);
        let other = registry.clone();

        let id = registry.trigger(10, site(1)).id;
        assert!(other.disable(id));
        assert_eq!(registry.state(id), EntryState::Inactive);
        assert_eq!(other.metrics().fired(), 1);
    }

    #[test]
    fn test_concurrent_trigger_fires_once() {
        use std::thread;

        let (registry, _clock) = registry(64);
        let registry = Arc::new(registry);
        let mut handles = vec![];

        for _ in 0..10 {
            let registry_clone = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                (0..100)
                    .filter(|_| registry_clone.trigger(1_000, site(1)).fired)
                    .count()
            }));
        }

        let fired: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(fired, 1);
        assert_eq!(registry.metrics().held(), 999);
    }

    #[test]
    fn test_concurrent_distinct_identities_bounded() {
        use std::thread;

        let (registry, _clock) = registry(64);
        let registry = Arc::new(registry);
        let mut handles = vec![];

        for i in 0..10u32 {
            let registry_clone = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for j in 0..20u32 {
                    let _ = registry_clone.trigger(10, site(i * 100 + j));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 64);
        assert_eq!(registry.metrics().fired(), 64);
        assert_eq!(registry.metrics().rejected(), 200 - 64);
    }
}
