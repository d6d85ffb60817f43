//! # sync-event
//!
//! Call-site keyed rate limiting for polling loops and firmware tasks.
//!
//! A trigger at a given source location fires at most once per interval, no
//! matter how often the surrounding code runs. Each call site gets its own
//! identity, derived from its file path and line, so no handle has to be
//! created or stored up front.
//!
//! ## Quick Start
//!
//! ```rust
//! use sync_event::{sync_event, EventRegistry};
//!
//! let registry = EventRegistry::new();
//!
//! let mut reports = 0;
//! for _ in 0..1_000 {
//!     // Fires on the first pass, then at most once per minute
//!     if sync_event!(registry, 60_000).fired {
//!         reports += 1;
//!     }
//! }
//! assert_eq!(reports, 1);
//! ```
//!
//! Without a registry argument, `sync_event!` uses the process-wide
//! registry returned by [`global()`]:
//!
//! ```rust
//! use sync_event::sync_event;
//!
//! if bool::from(sync_event!(1_000)) {
//!     // runs at most once per second
//! }
//! ```
//!
//! ## Controlling an Event
//!
//! The trigger result carries the event identity, which can be used away
//! from the call site:
//!
//! ```rust
//! use sync_event::{CallSite, EntryState, EventRegistry};
//!
//! let registry = EventRegistry::new();
//! let result = registry.trigger(10_000, CallSite::new("src/sensor.rs", 88));
//! assert!(result.fired);
//!
//! registry.disable(result.id);
//! assert_eq!(registry.state(result.id), EntryState::Inactive);
//!
//! registry.enable(result.id);
//! registry.force(result.id);
//! assert!(registry.trigger(10_000, CallSite::new("src/sensor.rs", 88)).fired);
//! ```
//!
//! - `reset` delays the next fire by a full interval
//! - `force` makes the next trigger fire regardless of interval
//! - `enable` / `disable` switch evaluation on and off, keeping the last
//!   fire time
//!
//! These only act on identities a trigger already registered. Called
//! earlier, they do nothing and return `false`.
//!
//! ## Capacity
//!
//! A registry tracks at most `capacity` distinct events (64 by default).
//! When it is full, a trigger from a new call site does not fire and is not
//! registered; a warning is logged through `tracing` the first time this
//! happens. Events already registered are unaffected.
//!
//! ```rust
//! use sync_event::{CallSite, EventRegistry};
//!
//! let registry = EventRegistry::builder().with_capacity(2).build().unwrap();
//! assert!(registry.trigger(100, CallSite::new("a.rs", 1)).fired);
//! assert!(registry.trigger(100, CallSite::new("a.rs", 2)).fired);
//! assert!(!registry.trigger(100, CallSite::new("a.rs", 3)).fired);
//! assert_eq!(registry.len(), 2);
//! assert_eq!(registry.metrics().rejected(), 1);
//! ```
//!
//! ## Identity Collisions
//!
//! Identities are a 32-bit rolling hash of the path plus the line number.
//! They are best-effort unique per call site: two locations whose hashes
//! happen to coincide share one event. The derivation is stable across
//! versions, so stored identity values stay valid.
//!
//! ## Observability
//!
//! ```rust
//! # use sync_event::EventRegistry;
//! # let registry = EventRegistry::new();
//! let snapshot = registry.metrics().snapshot();
//! println!("fired: {}", snapshot.fired);
//! println!("held back: {}", snapshot.held);
//! println!("rejected (registry full): {}", snapshot.rejected);
//! ```

// Domain layer - pure types
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    entry::{EntryState, EventEntry},
    identity::{CallSite, EventId},
    outcome::TriggerResult,
};

pub use application::{
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    registry::EventRegistry,
};

pub use infrastructure::{
    builder::{BuildError, EventRegistryBuilder, SharedStorage, DEFAULT_CAPACITY},
    clock::SystemClock,
    global::{global, install_global, AlreadyInitialized},
    storage::LockedStorage,
};

/// Trigger the event at the invocation site.
///
/// `sync_event!(interval_ms)` uses the process-wide registry;
/// `sync_event!(registry, interval_ms)` uses the given one. Both bind the
/// location with `file!()` and `line!()` and return a [`TriggerResult`].
///
/// ```rust
/// use sync_event::{sync_event, EventRegistry};
///
/// let registry = EventRegistry::new();
/// let first = sync_event!(registry, 500);
/// assert!(first.fired);
/// ```
#[macro_export]
macro_rules! sync_event {
    ($interval_ms:expr $(,)?) => {
        $crate::global().trigger(
            $interval_ms,
            $crate::CallSite::new(::core::file!(), ::core::line!()),
        )
    };
    ($registry:expr, $interval_ms:expr $(,)?) => {
        $registry.trigger(
            $interval_ms,
            $crate::CallSite::new(::core::file!(), ::core::line!()),
        )
    };
}
