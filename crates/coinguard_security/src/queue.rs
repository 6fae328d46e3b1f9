//! # Intake Queue
//!
//! Multi-producer, single-consumer buffer between game handler threads and
//! the flush worker.
//!
//! ```text
//!   Handler 1 ──┐
//!   Handler 2 ──┼──> [crossbeam channel] ──> drain_all() (one consumer at a time)
//!   Handler N ──┘      (never blocks)
//! ```
//!
//! Unbounded by default. With a bound configured, `push` still returns
//! immediately and the [`OverflowPolicy`] decides which record is discarded.

use crate::config::OverflowPolicy;
use crate::event::SecurityEvent;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Queue of events waiting for the next flush.
pub struct IntakeQueue {
    sender: Sender<SecurityEvent>,
    receiver: Receiver<SecurityEvent>,
    policy: OverflowPolicy,
    accepted: AtomicU64,
    dropped: AtomicU64,
    /// Set while a run of overflow drops is in progress, so only the first is reported.
    overflowing: AtomicBool,
}

impl IntakeQueue {
    /// Creates an unbounded queue.
    #[must_use]
    pub fn unbounded() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self::from_channel(sender, receiver, OverflowPolicy::DropNewest)
    }

    /// Creates a queue holding at most `capacity` records.
    #[must_use]
    pub fn bounded(capacity: usize, policy: OverflowPolicy) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self::from_channel(sender, receiver, policy)
    }

    /// Creates a queue from an optional bound.
    #[must_use]
    pub fn with_limit(max_pending: Option<usize>, policy: OverflowPolicy) -> Self {
        match max_pending {
            Some(capacity) => Self::bounded(capacity, policy),
            None => Self::unbounded(),
        }
    }

    fn from_channel(
        sender: Sender<SecurityEvent>,
        receiver: Receiver<SecurityEvent>,
        policy: OverflowPolicy,
    ) -> Self {
        Self {
            sender,
            receiver,
            policy,
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            overflowing: AtomicBool::new(false),
        }
    }

    /// Enqueues an event. Never blocks and never fails.
    pub fn push(&self, event: SecurityEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(event)) => self.overflow(event),
            // The queue owns its receiver, so this only happens mid-teardown.
            Err(TrySendError::Disconnected(_)) => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn overflow(&self, mut event: SecurityEvent) {
        if !self.overflowing.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                target: "coinguard::security",
                policy = ?self.policy,
                capacity = ?self.sender.capacity(),
                "security alert queue full, discarding records"
            );
        }

        match self.policy {
            OverflowPolicy::DropNewest => {
                self.accepted.fetch_add(1, Ordering::Relaxed);
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            OverflowPolicy::DropOldest => loop {
                if self.receiver.try_recv().is_ok() {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                match self.sender.try_send(event) {
                    Ok(()) => {
                        self.accepted.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Err(TrySendError::Full(rejected)) => event = rejected,
                    Err(TrySendError::Disconnected(_)) => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            },
        }
    }

    /// Removes every visible event, oldest first.
    ///
    /// Events pushed while this runs may land in this batch or the next one.
    /// Callers must not drain concurrently; the flush worker serializes this.
    #[must_use]
    pub fn drain_all(&self) -> Vec<SecurityEvent> {
        let batch: Vec<SecurityEvent> = self.receiver.try_iter().collect();
        if !batch.is_empty() {
            self.overflowing.store(false, Ordering::Relaxed);
        }
        batch
    }

    /// Number of events currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Events handed to `push` so far, including any the overflow policy discarded.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Events discarded by the overflow policy.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for IntakeQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}
