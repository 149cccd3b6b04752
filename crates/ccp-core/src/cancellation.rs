//! Cooperative cancellation shared across the retry engine, rate limiter and
//! database batch executor.
//!
//! A [`CancellationToken`] is a cheap, cloneable handle over a single atomic
//! flag. Every suspension point in the control plane (inter-attempt sleeps,
//! `wait_for_token` backoff, dependency polling) is expected to check it
//! before and during the wait, so that cancelling one handle aborts every
//! outstanding operation sharing it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A cloneable, shareable cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token as cancelled. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if [`Self::cancel`] has been called on this token or
    /// any clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, returning early with `Err(())` if the token is
    /// cancelled while sleeping. Polls in short slices rather than a single
    /// `tokio::time::sleep` so cancellation is observed promptly.
    pub async fn sleep_cancellable(&self, duration: Duration) -> Result<(), Cancelled> {
        const SLICE: Duration = Duration::from_millis(20);
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        let mut remaining = duration;
        while remaining > Duration::ZERO {
            let step = remaining.min(SLICE);
            tokio::time::sleep(step).await;
            if self.is_cancelled() {
                return Err(Cancelled);
            }
            remaining -= step;
        }
        Ok(())
    }
}

/// The operation was aborted because its [`CancellationToken`] was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cancelled")
    }
}

impl std::error::Error for Cancelled {}
