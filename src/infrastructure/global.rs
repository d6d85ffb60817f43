//! Process-wide default registry.
//!
//! The `sync_event!(interval)` macro form triggers against this registry.
//! It is created on first use with the default configuration, unless a
//! configured registry was installed earlier with [`install_global`].

use crate::application::registry::EventRegistry;
use std::sync::OnceLock;

static GLOBAL: OnceLock<EventRegistry> = OnceLock::new();

/// Error returned when the global registry is already initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the global event registry is already initialized")]
pub struct AlreadyInitialized;

/// Get the process-wide registry, creating it on first use.
pub fn global() -> &'static EventRegistry {
    GLOBAL.get_or_init(EventRegistry::new)
}

/// Install a configured registry as the process-wide registry.
///
/// Must run before the first call to [`global`] (or the first
/// `sync_event!(interval)`).
///
/// # Errors
/// Returns `AlreadyInitialized` if the global registry already exists.
pub fn install_global(registry: EventRegistry) -> Result<&'static EventRegistry, AlreadyInitialized> {
    let mut registry = Some(registry);
    let installed = GLOBAL.get_or_init(|| registry.take().unwrap_or_default());
    if registry.is_some() {
        return Err(AlreadyInitialized);
    }
    tracing::debug!(capacity = installed.capacity(), "installed global event registry");
    Ok(installed)
}
