//! Storage implementation for event state.
//!
//! A single lock around one hash map. All operations on the registry are
//! serialized by this lock; there is no per-key striping.

use crate::application::ports::Storage;
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Thread-safe storage backed by a `parking_lot::Mutex` around an
/// `ahash`-keyed `HashMap`.
///
/// Critical sections are O(1) map operations, so a blocking lock with an
/// unbounded wait is acceptable. `parking_lot` locks do not poison, so a
/// panicking accessor cannot make the storage unusable.
#[derive(Debug)]
pub struct LockedStorage<K, V> {
    map: Mutex<HashMap<K, V, RandomState>>,
}

impl<K, V> LockedStorage<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::with_hasher(RandomState::new())),
        }
    }

    /// Create an empty storage with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: Mutex::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::new(),
            )),
        }
    }

    /// Check if a key exists.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.lock().contains_key(key)
    }
}

impl<K, V> Default for LockedStorage<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for LockedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_bounded<F, R>(
        &self,
        key: K,
        capacity: usize,
        factory: impl FnOnce() -> V,
        accessor: F,
    ) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut map = self.map.lock();
        let len = map.len();
        match map.entry(key) {
            Entry::Occupied(entry) => Some(accessor(entry.into_mut())),
            Entry::Vacant(_) if len >= capacity => None,
            Entry::Vacant(entry) => Some(accessor(entry.insert(factory()))),
        }
    }

    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        self.map.lock().get_mut(key).map(accessor)
    }

    fn with_existing<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        self.map.lock().get(key).map(accessor)
    }

    fn len(&self) -> usize {
        self.map.lock().len()
    }

    fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }

    fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.map.lock().iter() {
            f(key, value);
        }
    }
}

// Implement Storage for Arc<LockedStorage> so clones of a registry share it
impl<K, V> Storage<K, V> for std::sync::Arc<LockedStorage<K, V>>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_bounded<F, R>(
        &self,
        key: K,
        capacity: usize,
        factory: impl FnOnce() -> V,
        accessor: F,
    ) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_bounded(key, capacity, factory, accessor)
    }

    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_existing_mut(key, accessor)
    }

    fn with_existing<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        (**self).with_existing(key, accessor)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V),
    {
        (**self).for_each(f)
    }
}
