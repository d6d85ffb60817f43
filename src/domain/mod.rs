//! Domain layer - pure types with no locking and no clock.
//!
//! - Call-site identity derivation
//! - Per-identity entry state and the fire condition
//! - Trigger outcomes

pub mod entry;
pub mod identity;
pub mod outcome;
