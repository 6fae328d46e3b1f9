//! # Flush Cycle
//!
//! The consumer half of the logger: drain the queue, hand the batch to the
//! sink, keep count.
//!
//! A [`Flusher`] lives behind one mutex shared by the scheduler thread and
//! the shutdown path, so two cycles never overlap.
//!
//! ## Failure Semantics
//!
//! The queue is drained before the write starts. If the sink then fails the
//! whole drained batch is counted as lost and is not re-queued. While the sink
//! is not ready at all the cycle does not drain, and events stay queued.

use crate::event::SecurityEvent;
use crate::queue::IntakeQueue;
use crate::sink::AlertSink;
use std::sync::Arc;

/// Result of one flush cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The sink is not ready; nothing was drained.
    Degraded,
    /// The queue was empty; the sink was not called.
    Empty,
    /// This many events were written.
    Written(usize),
    /// The write failed and this many drained events were discarded.
    Failed(usize),
    /// A cycle already in progress held the flusher past the shutdown
    /// timeout; nothing was drained.
    TimedOut,
}

/// Counters describing the logger's lifetime so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecurityLogStats {
    /// Events handed to an intake call.
    pub accepted: u64,
    /// Events discarded by the queue's overflow policy.
    pub dropped_on_overflow: u64,
    /// Events written to the sink.
    pub written: u64,
    /// Successful batches.
    pub batches: u64,
    /// Batches whose write failed.
    pub failed_batches: u64,
    /// Events drained into a failed batch.
    pub lost: u64,
    /// Events still queued.
    pub pending: u64,
}

impl SecurityLogStats {
    /// Counters readable from the queue alone, with sink-side counters zeroed.
    ///
    /// Used when the flusher is held by a stuck cycle.
    #[must_use]
    pub fn intake_only(queue: &IntakeQueue) -> Self {
        Self {
            accepted: queue.accepted(),
            dropped_on_overflow: queue.dropped(),
            pending: queue.len() as u64,
            ..Self::default()
        }
    }
}

/// Drains the intake queue into a sink.
pub struct Flusher {
    queue: Arc<IntakeQueue>,
    sink: Box<dyn AlertSink>,
    written: u64,
    batches: u64,
    failed_batches: u64,
    lost: u64,
}

impl Flusher {
    /// Creates a flusher consuming `queue`.
    pub fn new(queue: Arc<IntakeQueue>, sink: Box<dyn AlertSink>) -> Self {
        Self {
            queue,
            sink,
            written: 0,
            batches: 0,
            failed_batches: 0,
            lost: 0,
        }
    }

    /// Runs one drain + append cycle.
    pub fn flush_cycle(&mut self) -> FlushOutcome {
        if !self.sink.is_ready() {
            return FlushOutcome::Degraded;
        }

        let batch: Vec<SecurityEvent> = self.queue.drain_all();
        if batch.is_empty() {
            return FlushOutcome::Empty;
        }

        let count = batch.len();
        match self.sink.append_batch(&batch) {
            Ok(()) => {
                self.written += count as u64;
                self.batches += 1;
                tracing::debug!(target: "coinguard::security", count, "flushed security alerts");
                FlushOutcome::Written(count)
            }
            Err(err) => {
                self.failed_batches += 1;
                self.lost += count as u64;
                tracing::error!(
                    target: "coinguard::security",
                    %err,
                    lost = count,
                    "failed to flush security log"
                );
                FlushOutcome::Failed(count)
            }
        }
    }

    /// Returns true if the sink accepts batches.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.sink.is_ready()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> SecurityLogStats {
        SecurityLogStats {
            written: self.written,
            batches: self.batches,
            failed_batches: self.failed_batches,
            lost: self.lost,
            ..SecurityLogStats::intake_only(&self.queue)
        }
    }
}
