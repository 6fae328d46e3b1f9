//! # Security Log Error Types
//!
//! All errors that can occur while setting up or persisting the alert log.
//!
//! None of these ever reach a producer thread: the intake calls are
//! infallible, and the flush worker reports failures through `tracing`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the security log subsystem.
#[derive(Error, Debug)]
pub enum SecurityLogError {
    /// The directory holding the alert log could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The alert log file could not be created.
    #[error("failed to create alert log {path}: {source}")]
    CreateFile {
        /// File that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The header block could not be written to a freshly created log.
    #[error("failed to write header to {path}: {source}")]
    WriteHeader {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The alert log could not be opened for appending.
    #[error("failed to open alert log {path}: {source}")]
    OpenLog {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A batch could not be fully written.
    #[error("failed to append batch to {path}: {source}")]
    WriteBatch {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The sink refused the batch because it was never initialized.
    #[error("alert sink is not initialized")]
    SinkNotReady,

    /// The flush worker thread could not be started.
    #[error("failed to spawn flush worker: {0}")]
    SpawnWorker(std::io::Error),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Another logger in this process already owns the log path.
    #[error("a security logger is already active for {0}")]
    AlreadyActive(PathBuf),
}

/// Result type for security log operations.
pub type SecurityLogResult<T> = Result<T, SecurityLogError>;
