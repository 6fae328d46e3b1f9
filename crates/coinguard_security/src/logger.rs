//! # Security Logger
//!
//! The facade the plugin holds for its lifetime.
//!
//! ```text
//!   game handlers ──> AlertReporter ──> IntakeQueue          (never blocks)
//!                          │
//!                          └──> AlertConsole                  (critical only)
//!
//!   FlushScheduler ──> Flusher ──> FileSink                   (every interval)
//!   shutdown()     ──> Flusher ──> FileSink, then stop worker (bounded wait)
//! ```
//!
//! There is no global instance. The plugin creates one logger at startup,
//! hands [`AlertReporter`] clones to whatever needs to report, and calls
//! [`SecurityLogger::shutdown`] once when it unloads. Within a process only
//! one logger at a time may own a given log path.

use crate::config::SecurityLogConfig;
use crate::console::{AlertConsole, TracingConsole};
use crate::error::{SecurityLogError, SecurityLogResult};
use crate::event::{SecurityEvent, Severity};
use crate::flush::{FlushOutcome, Flusher, SecurityLogStats};
use crate::queue::IntakeQueue;
use crate::scheduler::FlushScheduler;
use crate::sink::{AlertSink, FileSink};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Log paths owned by a running logger in this process.
///
/// Two loggers appending to one file would interleave their batches and break
/// per-producer ordering, and nothing at the file level stops them. Keys are
/// resolved through [`log_key`] so aliases of one file collide.
static ACTIVE_LOGS: Mutex<BTreeSet<PathBuf>> = parking_lot::const_mutex(BTreeSet::new());

/// Absolute form of `path` with its longest existing prefix canonicalized.
///
/// The file and some parent directories may not exist yet; the missing tail is
/// appended with `.` and `..` resolved lexically.
fn log_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    let mut base = absolute.as_path();
    let mut tail = Vec::new();
    let root = loop {
        if let Ok(canonical) = fs::canonicalize(base) {
            break canonical;
        }
        let mut components = base.components();
        match components.next_back() {
            Some(last) => {
                tail.push(last);
                base = components.as_path();
            }
            None => break PathBuf::new(),
        }
    };

    tail.into_iter().rev().fold(root, |mut key, component| {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                key.pop();
            }
            other => key.push(other),
        }
        key
    })
}

/// Claim on a log path, released on drop.
struct ActiveLog(PathBuf);

impl ActiveLog {
    fn claim(path: &Path) -> SecurityLogResult<Self> {
        let key = log_key(path);
        if !ACTIVE_LOGS.lock().insert(key.clone()) {
            return Err(SecurityLogError::AlreadyActive(key));
        }
        Ok(Self(key))
    }
}

impl Drop for ActiveLog {
    fn drop(&mut self) {
        ACTIVE_LOGS.lock().remove(&self.0);
    }
}

/// Cheap, cloneable intake handle for event handlers.
///
/// Both calls return immediately. Events reported after the owning logger
/// shut down are queued but never written.
#[derive(Clone)]
pub struct AlertReporter {
    queue: Arc<IntakeQueue>,
    console: Arc<dyn AlertConsole>,
}

impl AlertReporter {
    /// Records an unauthorized access attempt.
    ///
    /// Emits the console line before returning, then queues the event.
    pub fn log_critical(
        &self,
        actor_id: Uuid,
        actor_name: &str,
        context: &str,
        action: &str,
        details: &str,
    ) {
        let event = SecurityEvent::new(
            Severity::Critical,
            actor_id,
            actor_name,
            context,
            action,
            details,
        );
        self.console.critical(&event);
        self.queue.push(event);
    }

    /// Records a suspicious but not definitively malicious event. Queue only.
    pub fn log_suspicious(
        &self,
        actor_id: Uuid,
        actor_name: &str,
        context: &str,
        action: &str,
        details: &str,
    ) {
        self.queue.push(SecurityEvent::new(
            Severity::Warning,
            actor_id,
            actor_name,
            context,
            action,
            details,
        ));
    }
}

/// What happened during [`SecurityLogger::shutdown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Outcome of the final synchronous flush, or [`FlushOutcome::TimedOut`]
    /// if a stuck cycle held the flusher for the whole shutdown timeout.
    pub final_flush: FlushOutcome,
    /// False if the flush worker outlived the shutdown timeout.
    pub worker_stopped: bool,
    /// Counters after the final flush. Sink-side counters are zero if the
    /// flusher was still held when shutdown gave up.
    pub stats: SecurityLogStats,
}

/// Owner of the security alert pipeline.
pub struct SecurityLogger {
    reporter: AlertReporter,
    flusher: Arc<Mutex<Flusher>>,
    scheduler: Option<FlushScheduler>,
    shutdown_timeout: Duration,
    _active: Option<ActiveLog>,
}

impl SecurityLogger {
    /// Starts a logger writing to `config.log_path`, with critical alerts
    /// echoed through `tracing`.
    ///
    /// If the log file cannot be created the failure is reported once and
    /// the logger still starts: events are accepted and stay queued.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::InvalidConfig`] for a bad config,
    /// [`SecurityLogError::AlreadyActive`] if another logger in this process
    /// owns the path, or [`SecurityLogError::SpawnWorker`].
    pub fn start(config: &SecurityLogConfig) -> SecurityLogResult<Self> {
        config.validate()?;
        let active = ActiveLog::claim(&config.log_path)?;

        let mut sink = FileSink::new(&config.log_path, config.tool_name.as_str());
        match sink.ensure_initialized() {
            Ok(true) => tracing::info!(
                target: "coinguard::security",
                path = %config.log_path.display(),
                "created security alert log"
            ),
            Ok(false) => {}
            Err(err) => tracing::error!(
                target: "coinguard::security",
                %err,
                "failed to initialize security log, alerts will be held in memory"
            ),
        }

        Self::launch(config, Box::new(sink), Arc::new(TracingConsole), Some(active))
    }

    /// Starts a logger with a caller-supplied sink and console.
    ///
    /// The sink is used as given; initialize it first if it needs it. If the
    /// sink reports a [`AlertSink::log_path`], that path is claimed exactly as
    /// [`Self::start`] claims it.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::InvalidConfig`],
    /// [`SecurityLogError::AlreadyActive`] or [`SecurityLogError::SpawnWorker`].
    pub fn start_with(
        config: &SecurityLogConfig,
        sink: Box<dyn AlertSink>,
        console: Arc<dyn AlertConsole>,
    ) -> SecurityLogResult<Self> {
        config.validate()?;
        let active = sink.log_path().map(ActiveLog::claim).transpose()?;
        Self::launch(config, sink, console, active)
    }

    fn launch(
        config: &SecurityLogConfig,
        sink: Box<dyn AlertSink>,
        console: Arc<dyn AlertConsole>,
        active: Option<ActiveLog>,
    ) -> SecurityLogResult<Self> {
        let queue = Arc::new(IntakeQueue::with_limit(config.max_pending, config.overflow));
        let flusher = Arc::new(Mutex::new(Flusher::new(Arc::clone(&queue), sink)));
        let scheduler = FlushScheduler::spawn(Arc::clone(&flusher), config.flush_interval())?;

        Ok(Self {
            reporter: AlertReporter { queue, console },
            flusher,
            scheduler: Some(scheduler),
            shutdown_timeout: config.shutdown_timeout(),
            _active: active,
        })
    }

    /// Returns a handle for reporting from other threads.
    #[must_use]
    pub fn reporter(&self) -> AlertReporter {
        self.reporter.clone()
    }

    /// See [`AlertReporter::log_critical`].
    pub fn log_critical(
        &self,
        actor_id: Uuid,
        actor_name: &str,
        context: &str,
        action: &str,
        details: &str,
    ) {
        self.reporter
            .log_critical(actor_id, actor_name, context, action, details);
    }

    /// See [`AlertReporter::log_suspicious`].
    pub fn log_suspicious(
        &self,
        actor_id: Uuid,
        actor_name: &str,
        context: &str,
        action: &str,
        details: &str,
    ) {
        self.reporter
            .log_suspicious(actor_id, actor_name, context, action, details);
    }

    /// Runs one flush cycle now, on the calling thread.
    ///
    /// Waits for an in-progress scheduled cycle to finish first.
    pub fn flush_now(&self) -> FlushOutcome {
        self.flusher.lock().flush_cycle()
    }

    /// Returns true if events are reaching the sink.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.flusher.lock().is_persistent()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> SecurityLogStats {
        self.flusher.lock().stats()
    }

    /// Flushes everything queued, then stops the worker.
    ///
    /// The whole sequence waits at most the configured shutdown timeout for
    /// the flusher and the worker. A cycle already stuck in the sink makes the
    /// final flush report [`FlushOutcome::TimedOut`] and leaves the worker
    /// detached.
    pub fn shutdown(mut self) -> ShutdownReport {
        self.shutdown_inner()
    }

    fn shutdown_inner(&mut self) -> ShutdownReport {
        let deadline = Instant::now() + self.shutdown_timeout;

        let final_flush = match self.flusher.try_lock_until(deadline) {
            Some(mut flusher) => flusher.flush_cycle(),
            None => {
                tracing::warn!(
                    target: "coinguard::security",
                    timeout = ?self.shutdown_timeout,
                    pending = self.reporter.queue.len(),
                    "security log flush still in progress, skipping final flush"
                );
                FlushOutcome::TimedOut
            }
        };

        let worker_stopped = match self.scheduler.take() {
            Some(scheduler) => {
                let stopped = scheduler.stop(deadline.saturating_duration_since(Instant::now()));
                if !stopped {
                    tracing::warn!(
                        target: "coinguard::security",
                        timeout = ?self.shutdown_timeout,
                        "security log flush worker did not stop in time, continuing shutdown"
                    );
                }
                stopped
            }
            None => true,
        };
        self._active = None;

        let stats = match self.flusher.try_lock() {
            Some(flusher) => flusher.stats(),
            None => SecurityLogStats::intake_only(&self.reporter.queue),
        };

        ShutdownReport {
            final_flush,
            worker_stopped,
            stats,
        }
    }
}

impl Drop for SecurityLogger {
    fn drop(&mut self) {
        if self.scheduler.is_some() {
            let _ = self.shutdown_inner();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_in(dir: &Path) -> SecurityLogConfig {
        SecurityLogConfig {
            flush_interval_ms: 60_000,
            ..SecurityLogConfig::with_path(dir.join("security_alerts.log"))
        }
    }

    fn data_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(4)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_shutdown_flushes_queue() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let logger = SecurityLogger::start(&config).unwrap();

        logger.log_suspicious(Uuid::nil(), "Bob", "BankGUI", "DEPOSIT", "negative amount");
        logger.log_critical(Uuid::nil(), "Bob", "BankGUI", "WITHDRAW", "no permission");

        let report = logger.shutdown();
        assert_eq!(report.final_flush, FlushOutcome::Written(2));
        assert!(report.worker_stopped);
        assert_eq!(report.stats.written, 2);

        let lines = data_lines(&config.log_path);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[WARNING]") && lines[0].ends_with("[DEPOSIT] negative amount"));
        assert!(lines[1].contains("[CRITICAL]") && lines[1].ends_with("[WITHDRAW] no permission"));
    }

    #[test]
    fn test_one_logger_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let first = SecurityLogger::start(&config).unwrap();

        let err = SecurityLogger::start(&config).err().unwrap();
        assert!(matches!(err, SecurityLogError::AlreadyActive(_)));

        first.shutdown();
        let second = SecurityLogger::start(&config).unwrap();
        second.shutdown();
    }

    #[test]
    fn test_start_with_file_sink_claims_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let first = SecurityLogger::start(&config).unwrap();

        let sink = FileSink::new(&config.log_path, "Coinguard");
        let err = SecurityLogger::start_with(&config, Box::new(sink), Arc::new(TracingConsole))
            .err()
            .unwrap();
        assert!(matches!(err, SecurityLogError::AlreadyActive(_)));
        first.shutdown();

        let mut sink = FileSink::new(&config.log_path, "Coinguard");
        sink.ensure_initialized().unwrap();
        let custom =
            SecurityLogger::start_with(&config, Box::new(sink), Arc::new(TracingConsole)).unwrap();
        assert!(matches!(
            SecurityLogger::start(&config).err().unwrap(),
            SecurityLogError::AlreadyActive(_)
        ));
        custom.shutdown();
    }

    #[test]
    fn test_path_aliases_share_one_claim() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let first = SecurityLogger::start(&config_in(dir.path())).unwrap();

        let dotted = SecurityLogConfig {
            flush_interval_ms: 60_000,
            ..SecurityLogConfig::with_path(dir.path().join("sub/../security_alerts.log"))
        };
        assert!(matches!(
            SecurityLogger::start(&dotted).err().unwrap(),
            SecurityLogError::AlreadyActive(_)
        ));
        first.shutdown();
    }

    #[test]
    fn test_claim_before_parent_exists_matches_later_alias() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = config_in(&dir.path().join("new"));
        let first = SecurityLogger::start(&fresh).unwrap();
        assert!(fresh.log_path.is_file());

        let aliased = config_in(&dir.path().join("new/../new"));
        assert!(matches!(
            SecurityLogger::start(&aliased).err().unwrap(),
            SecurityLogError::AlreadyActive(_)
        ));
        first.shutdown();
    }

    #[test]
    fn test_drop_releases_path_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        {
            let logger = SecurityLogger::start(&config).unwrap();
            logger.log_suspicious(Uuid::nil(), "Eve", "ShopGUI", "BUY", "");
        }

        assert_eq!(data_lines(&config.log_path).len(), 1);
        SecurityLogger::start(&config).unwrap().shutdown();
    }

    #[test]
    fn test_restart_does_not_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        for _ in 0..3 {
            let logger = SecurityLogger::start(&config).unwrap();
            logger.log_suspicious(Uuid::nil(), "Eve", "ShopGUI", "BUY", "");
            logger.shutdown();
        }

        let content = fs::read_to_string(&config.log_path).unwrap();
        assert_eq!(content.matches("Security Alerts").count(), 1);
        assert_eq!(content.matches("---\n").count(), 1);
        assert_eq!(data_lines(&config.log_path).len(), 3);
    }

    #[test]
    fn test_init_failure_keeps_accepting() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let config = SecurityLogConfig::with_path(blocker.join("alerts.log"));

        let logger = SecurityLogger::start(&config).unwrap();
        assert!(!logger.is_persistent());

        logger.log_critical(Uuid::nil(), "Mallory", "ShopGUI", "WITHDRAW", "");
        logger.log_suspicious(Uuid::nil(), "Mallory", "ShopGUI", "SELL", "");
        assert_eq!(logger.flush_now(), FlushOutcome::Degraded);

        let report = logger.shutdown();
        assert_eq!(report.final_flush, FlushOutcome::Degraded);
        assert_eq!(report.stats.accepted, 2);
        assert_eq!(report.stats.pending, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = SecurityLogConfig {
            shutdown_timeout_ms: 0,
            ..config_in(dir.path())
        };
        assert!(matches!(
            SecurityLogger::start(&config).err().unwrap(),
            SecurityLogError::InvalidConfig(_)
        ));
    }
}
