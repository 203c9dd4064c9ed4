//! Outlets through which the copy task reports to its caller.
//!
//! [`ErrorOutlet`] is a bounded queue of copy failures; it closes once the
//! copy task has exited and the dumper dropped the last sender, after which
//! [`ErrorOutlet::drain`] returns without waiting. [`CompletionOutlet`] is a
//! single-slot flag set only when the stream reached its end cleanly.
//!
//! Both are cheap handles: clone them freely and await them side by side in
//! one `tokio::select!`.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};

use super::error::DumpError;

/// Receiving side of the error queue.
#[derive(Debug, Clone)]
pub struct ErrorOutlet {
    rx: Arc<Mutex<mpsc::Receiver<DumpError>>>,
}

impl ErrorOutlet {
    /// Creates the queue; `capacity` is clamped to at least one slot.
    pub(crate) fn channel(capacity: usize) -> (mpsc::Sender<DumpError>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                rx: Arc::new(Mutex::new(rx)),
            },
        )
    }

    /// Waits for the next error; `None` once the outlet is closed and empty.
    ///
    /// Cancel safe, so it can sit in a `select!` branch.
    pub async fn recv(&self) -> Option<DumpError> {
        self.rx.lock().await.recv().await
    }

    /// Returns a buffered error without waiting.
    ///
    /// Also returns `None` while another handle is parked in
    /// [`recv`](Self::recv) or [`drain`](Self::drain), even if errors are
    /// buffered.
    #[must_use]
    pub fn try_recv(&self) -> Option<DumpError> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Collects every remaining error until the outlet closes.
    ///
    /// Only finite after [`StreamDumper::stop`](super::StreamDumper::stop)
    /// returned; before that it waits for the copy task to finish.
    pub async fn drain(&self) -> Vec<DumpError> {
        let mut rx = self.rx.lock().await;
        let mut errors = Vec::new();
        while let Some(error) = rx.recv().await {
            errors.push(error);
        }
        errors
    }
}

/// Single-slot signal that the stream reached its end without error.
#[derive(Debug, Clone)]
pub struct CompletionOutlet {
    rx: watch::Receiver<bool>,
}

impl CompletionOutlet {
    pub(crate) fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// Resolves once the stream has finished.
    ///
    /// Never resolves for a run that ended in an error or a cancellation.
    pub async fn finished(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|done| *done).await.is_err() {
            // Sender gone without ever signalling: this run will not finish.
            std::future::pending::<()>().await;
        }
    }

    /// Returns true if the stream has finished.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        *self.rx.borrow()
    }
}
