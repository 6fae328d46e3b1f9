//! # Security Events
//!
//! One immutable record per audit occurrence.
//!
//! ## Line Format
//!
//! ```text
//! [yyyy-MM-dd HH:mm:ss] [SEVERITY] [actor-uuid] [actor-name] [context] [action] details
//! ```
//!
//! Ordering between events is defined by intake order only. Two events may
//! carry the same timestamp.

use chrono::{Local, NaiveDateTime, SubsecRound};
use std::fmt;
use uuid::Uuid;

/// Timestamp layout used in the alert log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How serious an alert is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Suspicious but not definitively malicious.
    Warning,
    /// A client tried to bypass a permission check.
    Critical,
}

impl Severity {
    /// Label written into the log line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit occurrence.
///
/// Fields are private; once built an event never changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityEvent {
    timestamp: NaiveDateTime,
    severity: Severity,
    actor_id: Uuid,
    actor_name: String,
    context: String,
    action: String,
    details: String,
}

impl SecurityEvent {
    /// Creates an event stamped with the current local time (whole seconds).
    pub fn new(
        severity: Severity,
        actor_id: Uuid,
        actor_name: impl Into<String>,
        context: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::at(
            Local::now().naive_local(),
            severity,
            actor_id,
            actor_name,
            context,
            action,
            details,
        )
    }

    /// Creates an event with an explicit timestamp, truncated to seconds.
    #[allow(clippy::too_many_arguments)]
    pub fn at(
        timestamp: NaiveDateTime,
        severity: Severity,
        actor_id: Uuid,
        actor_name: impl Into<String>,
        context: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            severity,
            actor_id,
            actor_name: actor_name.into(),
            context: context.into(),
            action: action.into(),
            details: details.into(),
        }
    }

    /// Time the event was accepted.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Stable id of the acting player.
    #[must_use]
    pub const fn actor_id(&self) -> Uuid {
        self.actor_id
    }

    /// Display name captured at intake time.
    #[must_use]
    pub fn actor_name(&self) -> &str {
        &self.actor_name
    }

    /// UI or subsystem the action targeted.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Short label of the attempted operation.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Free-form diagnostic text.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }
}

/// Renders the one-line log form, without a trailing newline.
impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}] [{}] [{}] [{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.actor_id,
            self.actor_name,
            self.context,
            self.action,
            self.details
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_milli_opt(9, 26, 53, 589)
            .unwrap()
    }

    #[test]
    fn test_line_format() {
        let id = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
        let event = SecurityEvent::at(
            fixed_time(),
            Severity::Critical,
            id,
            "Alice",
            "ShopGUI",
            "WITHDRAW",
            "bypassed lock",
        );

        assert_eq!(
            event.to_string(),
            "[2026-03-14 09:26:53] [CRITICAL] [11111111-1111-1111-1111-111111111111] \
             [Alice] [ShopGUI] [WITHDRAW] bypassed lock"
        );
    }

    #[test]
    fn test_timestamp_truncated_to_seconds() {
        let event = SecurityEvent::at(
            fixed_time(),
            Severity::Warning,
            Uuid::nil(),
            "Bob",
            "BankGUI",
            "DEPOSIT",
            "",
        );

        assert_eq!(event.timestamp().nanosecond(), 0);
        assert!(event.to_string().starts_with("[2026-03-14 09:26:53] [WARNING]"));
    }

    #[test]
    fn test_details_may_be_empty() {
        let event = SecurityEvent::at(
            fixed_time(),
            Severity::Warning,
            Uuid::nil(),
            "Bob",
            "BankGUI",
            "DEPOSIT",
            "",
        );

        assert!(event.to_string().ends_with("[BankGUI] [DEPOSIT] "));
    }
}
