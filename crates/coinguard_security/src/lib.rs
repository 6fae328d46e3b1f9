//! # Coinguard Security - The Alert Ledger
//!
//! Asynchronous security alert logging for the economy plugin.
//!
//! ## Guarantees
//!
//! - **Never blocks a handler**: intake is a non-blocking queue push
//! - **Ordered**: each producer's alerts are written in the order it made them
//! - **Written once**: a drained alert reaches the log at most once
//! - **Batched**: one file open per flush cycle, not per alert
//! - **Contained**: no I/O failure ever surfaces in a caller thread
//!
//! ## Architecture
//!
//! ```text
//! GAME HANDLERS                          FLUSH WORKER
//!     │                                      │ every flush_interval
//!     │── log_critical ──► console line      │
//!     │── log_critical ─┐                    ▼
//!     │── log_suspicious┴─► IntakeQueue ──► drain_all ──► FileSink (append)
//!     │                                      ▲
//!  PLUGIN UNLOAD                             │
//!     └── shutdown ──────────────────────────┘ final flush, bounded wait
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use coinguard_security::{SecurityLogConfig, SecurityLogger};
//! use uuid::Uuid;
//!
//! let logger = SecurityLogger::start(&SecurityLogConfig::default())?;
//! let reporter = logger.reporter();
//!
//! reporter.log_critical(Uuid::new_v4(), "Alice", "ShopGUI", "WITHDRAW", "bypassed lock");
//!
//! let report = logger.shutdown();
//! assert!(report.worker_stopped);
//! # Ok::<(), coinguard_security::SecurityLogError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod console;
pub mod error;
pub mod event;
pub mod flush;
pub mod logger;
pub mod queue;
pub mod scheduler;
pub mod sink;

pub use config::{OverflowPolicy, SecurityLogConfig};
pub use console::{AlertConsole, TracingConsole};
pub use error::{SecurityLogError, SecurityLogResult};
pub use event::{SecurityEvent, Severity};
pub use flush::{FlushOutcome, SecurityLogStats};
pub use logger::{AlertReporter, SecurityLogger, ShutdownReport};
pub use queue::IntakeQueue;
pub use sink::{AlertSink, FileSink};
