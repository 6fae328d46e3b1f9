//! # Flush Scheduler
//!
//! One dedicated worker thread fires a flush cycle at a fixed interval.
//!
//! ```text
//!   tick(interval) ──┐
//!                    ├──> [security-log-flush thread] ──> Flusher (mutex) ──> sink
//!   stop signal ─────┘
//! ```
//!
//! The first cycle runs one interval after start. Ticks that arrive while a
//! cycle is still running are coalesced, so cycles never overlap.

use crate::error::{SecurityLogError, SecurityLogResult};
use crate::flush::Flusher;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "security-log-flush";

/// Periodic flush worker.
pub struct FlushScheduler {
    stop_tx: Sender<()>,
    /// Disconnects when the worker thread exits.
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

impl FlushScheduler {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityLogError::SpawnWorker`] if the OS refuses the thread.
    pub fn spawn(flusher: Arc<Mutex<Flusher>>, interval: Duration) -> SecurityLogResult<Self> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let _done = done_tx;
                Self::worker_loop(&flusher, interval, &stop_rx);
            })
            .map_err(SecurityLogError::SpawnWorker)?;

        Ok(Self {
            stop_tx,
            done_rx,
            handle,
        })
    }

    fn worker_loop(flusher: &Mutex<Flusher>, interval: Duration, stop_rx: &Receiver<()>) {
        let ticker = crossbeam_channel::tick(interval);
        tracing::debug!(target: "coinguard::security", ?interval, "flush worker started");

        loop {
            crossbeam_channel::select! {
                recv(ticker) -> _ => {
                    flusher.lock().flush_cycle();
                }
                recv(stop_rx) -> _ => break,
            }
        }

        tracing::debug!(target: "coinguard::security", "flush worker stopped");
    }

    /// Signals the worker to stop and waits up to `timeout` for it to exit.
    ///
    /// Returns `false` if the worker was still running when the wait ran out;
    /// the thread is then left detached.
    pub fn stop(self, timeout: Duration) -> bool {
        // Err means the worker already exited and dropped its receiver.
        let _ = self.stop_tx.send(());

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    tracing::error!(target: "coinguard::security", "flush worker panicked");
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}
