//! # Alert Sinks
//!
//! Where drained batches end up. [`FileSink`] is the production sink: an
//! append-only text file with a one-time header block.
//!
//! ## File Layout
//!
//! ```text
//! # <tool> Security Alerts
//! # These indicate potential hack attempts - NO FALSE POSITIVES EXPECTED
//! # Format: [timestamp] [severity] [uuid] [username] [context] [action] [details]
//! ---
//! [2026-03-14 09:26:53] [CRITICAL] [...] [Alice] [ShopGUI] [WITHDRAW] bypassed lock
//! ```
//!
//! The header is written only by [`FileSink::ensure_initialized`]. An existing
//! file is never truncated or re-headed, and a log removed while running is
//! recreated by the next batch without one.

use crate::error::{SecurityLogError, SecurityLogResult};
use crate::event::SecurityEvent;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Destination for drained batches.
///
/// Only the flush worker calls into a sink, one batch at a time.
pub trait AlertSink: Send {
    /// Returns false while the sink cannot accept batches.
    ///
    /// The flush cycle leaves events queued instead of draining them into a
    /// sink that is not ready.
    fn is_ready(&self) -> bool;

    /// Writes `events` in order as one write transaction.
    ///
    /// # Errors
    ///
    /// Any failure is returned; lines before the failure point may already
    /// have reached the file.
    fn append_batch(&mut self, events: &[SecurityEvent]) -> SecurityLogResult<()>;

    /// File this sink writes to, if any. A logger claims it for its lifetime.
    fn log_path(&self) -> Option<&Path> {
        None
    }
}

/// Builds the header block for a new log.
#[must_use]
pub fn header(tool_name: &str) -> String {
    format!(
        "# {tool_name} Security Alerts\n\
         # These indicate potential hack attempts - NO FALSE POSITIVES EXPECTED\n\
         # Format: [timestamp] [severity] [uuid] [username] [context] [action] [details]\n\
         ---\n"
    )
}

/// Append-only alert log on disk.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    tool_name: String,
    initialized: bool,
}

impl FileSink {
    /// Creates a sink for `path`. Nothing touches the disk until
    /// [`Self::ensure_initialized`].
    pub fn new(path: impl Into<PathBuf>, tool_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tool_name: tool_name.into(),
            initialized: false,
        }
    }

    /// Log file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates parent directories, the file and its header if the file does
    /// not exist yet. Idempotent.
    ///
    /// Returns `true` if this call created the file.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::CreateDir`], [`SecurityLogError::CreateFile`]
    /// or [`SecurityLogError::WriteHeader`]. The sink stays not ready.
    pub fn ensure_initialized(&mut self) -> SecurityLogResult<bool> {
        if self.path.is_file() {
            self.initialized = true;
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SecurityLogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // create_new: a concurrent creator wins and we must not add a second header.
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                self.initialized = true;
                return Ok(false);
            }
            Err(source) => {
                return Err(SecurityLogError::CreateFile {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut writer = BufWriter::new(file);
        writer
            .write_all(header(&self.tool_name).as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| SecurityLogError::WriteHeader {
                path: self.path.clone(),
                source,
            })?;

        self.initialized = true;
        Ok(true)
    }
}

impl AlertSink for FileSink {
    fn is_ready(&self) -> bool {
        self.initialized
    }

    fn append_batch(&mut self, events: &[SecurityEvent]) -> SecurityLogResult<()> {
        if !self.initialized {
            return Err(SecurityLogError::SinkNotReady);
        }
        if events.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| SecurityLogError::OpenLog {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = BufWriter::new(file);
        let written: std::io::Result<()> = events
            .iter()
            .try_for_each(|event| writeln!(writer, "{event}"))
            .and_then(|()| writer.flush());

        written.map_err(|source| SecurityLogError::WriteBatch {
            path: self.path.clone(),
            source,
        })
    }

    fn log_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
