//! # Security Log Configuration
//!
//! Loaded once at plugin startup from a TOML table. Every key is optional.
//!
//! ```toml
//! log_path = "mods/Coinguard/security_alerts.log"
//! tool_name = "Coinguard"
//! flush_interval_ms = 5000
//! shutdown_timeout_ms = 5000
//! # max_pending = 100000
//! # overflow = "drop_oldest"
//! ```

use crate::error::{SecurityLogError, SecurityLogResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the intake queue does with a record that does not fit.
///
/// Only consulted when [`SecurityLogConfig::max_pending`] is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Discard the record being pushed.
    #[default]
    DropNewest,
    /// Evict the oldest queued record to make room.
    DropOldest,
}

/// Configuration for the security logger.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityLogConfig {
    /// Alert log location.
    pub log_path: PathBuf,
    /// Name shown in the first header line.
    pub tool_name: String,
    /// Time between flush cycles (ms). Also the delay before the first one.
    pub flush_interval_ms: u64,
    /// How long shutdown waits for the flush worker to exit (ms).
    pub shutdown_timeout_ms: u64,
    /// Maximum queued records. `None` keeps the queue unbounded.
    pub max_pending: Option<usize>,
    /// Overflow behaviour when `max_pending` is reached.
    pub overflow: OverflowPolicy,
}

impl Default for SecurityLogConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("mods/Coinguard/security_alerts.log"),
            tool_name: "Coinguard".to_string(),
            flush_interval_ms: 5_000,
            shutdown_timeout_ms: 5_000,
            max_pending: None,
            overflow: OverflowPolicy::DropNewest,
        }
    }
}

impl SecurityLogConfig {
    /// Default settings writing to `log_path`.
    pub fn with_path(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::InvalidConfig`] on malformed TOML, unknown
    /// keys or out-of-range values.
    pub fn from_toml_str(source: &str) -> SecurityLogResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| SecurityLogError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::ConfigRead`] if the file cannot be read,
    /// otherwise the same errors as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> SecurityLogResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| {
            SecurityLogError::ConfigRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> SecurityLogResult<()> {
        if self.flush_interval_ms == 0 {
            return Err(SecurityLogError::InvalidConfig(
                "flush_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.shutdown_timeout_ms == 0 {
            return Err(SecurityLogError::InvalidConfig(
                "shutdown_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_pending == Some(0) {
            return Err(SecurityLogError::InvalidConfig(
                "max_pending must be greater than zero when set".to_string(),
            ));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(SecurityLogError::InvalidConfig(
                "log_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Flush interval as a [`Duration`].
    #[must_use]
    pub const fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Shutdown wait bound as a [`Duration`].
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SecurityLogConfig::default();
        assert_eq!(config.flush_interval(), Duration::from_secs(5));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_pending, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SecurityLogConfig::from_toml_str("").unwrap();
        assert_eq!(config, SecurityLogConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = SecurityLogConfig::from_toml_str(
            r#"
            log_path = "/srv/game/alerts.log"
            flush_interval_ms = 250
            max_pending = 64
            overflow = "drop_oldest"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_path, PathBuf::from("/srv/game/alerts.log"));
        assert_eq!(config.flush_interval(), Duration::from_millis(250));
        assert_eq!(config.max_pending, Some(64));
        assert_eq!(config.overflow, OverflowPolicy::DropOldest);
        assert_eq!(config.tool_name, "Coinguard");
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = SecurityLogConfig::from_toml_str("flush_interval_ms = 0").unwrap_err();
        assert!(matches!(err, SecurityLogError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_bound() {
        let err = SecurityLogConfig::from_toml_str("max_pending = 0").unwrap_err();
        assert!(matches!(err, SecurityLogError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_unknown_key() {
        let err = SecurityLogConfig::from_toml_str("flush_every = 3").unwrap_err();
        assert!(matches!(err, SecurityLogError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SecurityLogConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SecurityLogError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("security.toml");
        std::fs::write(&path, "tool_name = \"Vault\"\nshutdown_timeout_ms = 100\n").unwrap();

        let config = SecurityLogConfig::load(&path).unwrap();
        assert_eq!(config.tool_name, "Vault");
        assert_eq!(config.shutdown_timeout(), Duration::from_millis(100));
    }
}
