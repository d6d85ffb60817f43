//! Trigger outcome returned to call sites.

use crate::domain::identity::EventId;

/// Result of a trigger: whether it fired, and which identity it evaluated.
///
/// The identity lets the caller reset, force, enable or disable this event
/// from outside the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct TriggerResult {
    /// Whether the event fired
    pub fired: bool,
    /// Identity of the evaluated event
    pub id: EventId,
}

impl TriggerResult {
    /// Create a trigger result.
    pub fn new(fired: bool, id: EventId) -> Self {
        Self { fired, id }
    }

    /// Check if the event fired.
    pub fn fired(&self) -> bool {
        self.fired
    }

    /// Identity of the evaluated event.
    pub fn id(&self) -> EventId {
        self.id
    }
}

impl From<TriggerResult> for bool {
    fn from(result: TriggerResult) -> Self {
        result.fired
    }
}

impl PartialEq<bool> for TriggerResult {
    fn eq(&self, other: &bool) -> bool {
        self.fired == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_conversion() {
        let id = EventId::from_raw(7);
        let fired: bool = TriggerResult::new(true, id).into();
        assert!(fired);
        assert_eq!(TriggerResult::new(false, id), false);
        assert_eq!(TriggerResult::new(true, id).id(), id);
    }
}
