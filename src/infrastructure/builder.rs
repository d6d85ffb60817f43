//! Registry construction and configuration.

use crate::application::ports::Clock;
use crate::application::registry::EventRegistry;
use crate::domain::{entry::EventEntry, identity::EventId};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::LockedStorage;
use std::sync::Arc;

/// Default number of distinct events a registry tracks.
pub const DEFAULT_CAPACITY: usize = 64;

/// Storage backend used by registries built here.
pub type SharedStorage = Arc<LockedStorage<EventId, EventEntry>>;

/// Error returned when building an `EventRegistry` fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Capacity must be greater than zero
    #[error("capacity must be greater than 0")]
    ZeroCapacity,
}

/// Builder for constructing an `EventRegistry`.
#[derive(Debug)]
pub struct EventRegistryBuilder {
    capacity: usize,
    clock: Option<Arc<dyn Clock>>,
}

impl EventRegistryBuilder {
    /// Set the maximum number of distinct events to track.
    ///
    /// Once reached, triggers for new call sites do not fire and are not
    /// registered. Registered events keep working.
    ///
    /// Default: 64 events
    ///
    /// The value will be validated when `build()` is called.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the registry.
    ///
    /// # Errors
    /// Returns `BuildError::ZeroCapacity` if the capacity is 0.
    pub fn build(self) -> Result<EventRegistry, BuildError> {
        if self.capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let storage = Arc::new(LockedStorage::with_capacity(self.capacity));

        Ok(EventRegistry::with_storage(storage, clock, self.capacity))
    }
}

impl Default for EventRegistryBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            clock: None,
        }
    }
}

impl EventRegistry<SharedStorage> {
    /// Create a registry with the default capacity and the system clock.
    pub fn new() -> Self {
        Self::with_storage(
            Arc::new(LockedStorage::with_capacity(DEFAULT_CAPACITY)),
            Arc::new(SystemClock::new()),
            DEFAULT_CAPACITY,
        )
    }

    /// Create a builder for configuring a registry.
    pub fn builder() -> EventRegistryBuilder {
        EventRegistryBuilder::default()
    }
}

impl Default for EventRegistry<SharedStorage> {
    fn default() -> Self {
        Self::new()
    }
}
