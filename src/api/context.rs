//! Request cancellation and deadlines.
//!
//! A [`Context`] is attached to a [`crate::Client`] and applies to every
//! request made through it, on top of the client's per-request timeout.

use std::future::{pending, Future};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use super::error::{ApiError, Result};

/// Deadline and cancellation scope for requests.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every request running under the paired [`Context`].
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may all be gone already; nothing left to cancel then.
        let _ = self.0.send(true);
    }
}

impl Context {
    /// No deadline, not cancellable.
    pub fn background() -> Self {
        Self::default()
    }

    /// Abort requests still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort requests still running `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Make this context cancellable through the returned handle.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle(tx))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drive `fut` to completion unless the context ends first.
    pub(crate) async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(ApiError::DeadlineExceeded);
        }

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // Handle dropped without cancelling.
                        pending::<()>().await;
                    }
                },
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            out = fut => Ok(out),
            _ = cancelled => Err(ApiError::Cancelled),
            _ = expired => Err(ApiError::DeadlineExceeded),
        }
    }
}
