use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::info;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

/// Result of a cancellable wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Cancelled,
}

/// Shared stop signal. Cancelling is sticky: once set, every later wait
/// returns immediately.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!("Cancellation requested");
        }
        // A full channel already holds a pending wake-up
        let _ = self.wake_tx.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Blocks for `timeout` unless cancelled first.
    pub fn wait(&self, timeout: Duration) -> Wait {
        if self.is_cancelled() {
            return Wait::Cancelled;
        }
        match self.wake_rx.recv_timeout(timeout) {
            Ok(()) => Wait::Cancelled,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                if self.is_cancelled() {
                    Wait::Cancelled
                } else {
                    Wait::Elapsed
                }
            }
        }
    }
}
