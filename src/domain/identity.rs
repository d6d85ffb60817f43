//! Call-site identity derivation.
//!
//! An event identity is computed from the source location of a trigger:
//! a polynomial rolling hash (`h * 31 + byte`) over the path bytes, with the
//! line number added to the final hash.
//!
//! Identities are best-effort unique per call site, not guaranteed unique.
//! Because the line is added rather than mixed in, two locations satisfy
//! `hash(path1) + line1 == hash(path2) + line2` collide and share one event.
//! The derivation is kept stable so identity values do not change between
//! versions.

use std::borrow::Cow;
use std::fmt;

/// Identity of one logical rate-limited event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u32);

impl EventId {
    /// Derive the identity of the call site at `path:line`.
    ///
    /// Pure and deterministic: the same `(path, line)` always yields the same
    /// identity, across calls and across process restarts.
    pub fn derive(path: &str, line: u32) -> Self {
        let hash = path
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
        EventId(hash.wrapping_add(line))
    }

    /// Wrap a raw identity value, e.g. one stored by the caller earlier.
    pub const fn from_raw(raw: u32) -> Self {
        EventId(raw)
    }

    /// Get the raw identity value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Source location a trigger originates from.
///
/// The path is a `Cow` so that `file!()` literals are stored without
/// allocating, while runtime paths are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    path: Cow<'static, str>,
    line: u32,
}

impl CallSite {
    /// Create a call site descriptor.
    pub fn new(path: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Source file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Source line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Identity of this call site.
    pub fn id(&self) -> EventId {
        EventId::derive(&self.path, self.line)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}
