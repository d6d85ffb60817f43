//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::hash::Hash;

/// Port for obtaining current time.
///
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
/// Implementations must be monotonic and safe to call concurrently without
/// external locking.
pub trait Clock: Send + Sync + Debug {
    /// Current time in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Port for bounded key-value storage guarded by a single lock.
///
/// Every method runs as one critical section. The lock is released on every
/// exit path, including when an accessor returns early.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry mutably, inserting it first if it is missing and the
    /// storage holds fewer than `capacity` entries.
    ///
    /// The capacity check happens before any insertion, so a rejected key
    /// never occupies a slot.
    ///
    /// # Returns
    /// `Some` with the accessor's result, or `None` if the key was missing
    /// and could not be admitted.
    fn with_entry_bounded<F, R>(
        &self,
        key: K,
        capacity: usize,
        factory: impl FnOnce() -> V,
        accessor: F,
    ) -> Option<R>
    where
        F: FnOnce(&mut V) -> R;

    /// Access an existing entry mutably. Never inserts.
    ///
    /// # Returns
    /// `Some` with the accessor's result, or `None` if the key is unknown.
    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R;

    /// Read an existing entry. Never inserts.
    fn with_existing<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Iterate over all entries, providing access to both key and value.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);
}
