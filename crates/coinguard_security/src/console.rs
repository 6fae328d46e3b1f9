//! Live operator console for critical alerts.

use crate::event::SecurityEvent;

/// Receives the immediate line emitted for every critical alert.
///
/// Called synchronously on the producer's thread before the intake call
/// returns, so implementations must not wait on the alert log.
pub trait AlertConsole: Send + Sync {
    /// Emits one human-readable line for `event`.
    fn critical(&self, event: &SecurityEvent);
}

/// Console backed by `tracing` at WARN level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingConsole;

impl AlertConsole for TracingConsole {
    fn critical(&self, event: &SecurityEvent) {
        tracing::warn!(
            target: "coinguard::security",
            actor_id = %event.actor_id(),
            "{}",
            console_line(event)
        );
    }
}

/// Text of the console line for `event`.
#[must_use]
pub fn console_line(event: &SecurityEvent) -> String {
    format!(
        "[SECURITY] Unauthorized access: {} attempted {} on {} ({})",
        event.actor_name(),
        event.action(),
        event.context(),
        event.details()
    )
}
