//! Per-identity event state.
//!
//! An entry holds the timestamp of its last successful trigger and an
//! enabled flag. Entries are created on the first admitted trigger and are
//! never removed.

use crate::domain::identity::CallSite;

/// Lifecycle state of an event identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// The identity has never been admitted by a trigger
    Unregistered,
    /// Registered and evaluated against its interval
    Active,
    /// Registered but disabled; triggers never fire
    Inactive,
}

/// State stored for each registered identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    /// Millisecond timestamp of the last fire, `None` if it never fired
    pub last_fired: Option<u64>,
    /// Whether triggers are evaluated at all
    pub enabled: bool,
    /// Location that registered the entry, when known
    pub origin: Option<CallSite>,
}

impl EventEntry {
    /// Create a fresh entry: never fired, enabled.
    pub fn new(origin: Option<CallSite>) -> Self {
        Self {
            last_fired: None,
            enabled: true,
            origin,
        }
    }

    /// Evaluate the fire condition at `now` and record the fire if it holds.
    ///
    /// Fires when the entry never fired or when strictly more than
    /// `interval_ms` elapsed since the last fire. A disabled entry never
    /// fires. `last_fired` is only written on a fire.
    pub fn try_fire(&mut self, now: u64, interval_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }

        let due = match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) > interval_ms,
        };

        if due {
            self.last_fired = Some(now);
        }
        due
    }

    /// Delay the next fire by a full interval, as if it fired at `now`.
    pub fn reset(&mut self, now: u64) {
        self.last_fired = Some(now);
    }

    /// Make the next enabled trigger fire regardless of interval.
    pub fn force(&mut self) {
        self.last_fired = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EntryState {
        if self.enabled {
            EntryState::Active
        } else {
            EntryState::Inactive
        }
    }
}

impl Default for EventEntry {
    fn default() -> Self {
        Self::new(None)
    }
}
