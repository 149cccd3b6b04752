//! Retryability and delay-shaping policy for a single retry configuration.

use crate::backoff::{IntervalFunction, Jitter};
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a given error should be retried.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Scales the base backoff delay based on the error that triggered the
/// retry, e.g. doubling the delay for a rate-limit response or multiplying
/// by 1.5 for a slow timeout. Returning `1.0` leaves the base delay alone.
pub type DelayMultiplier<E> = Arc<dyn Fn(&E) -> f64 + Send + Sync>;

/// Combines a backoff strategy with retryability rules and delay shaping.
///
/// `RetryPolicy` itself never sleeps or counts attempts; [`Retry::call`]
/// drives the loop and calls [`Self::should_retry`] and [`Self::next_backoff`]
/// at the right points.
pub struct RetryPolicy<E> {
    interval_fn: Arc<dyn IntervalFunction>,
    pub(crate) retry_predicate: Option<RetryPredicate<E>>,
    pub(crate) delay_multiplier: Option<DelayMultiplier<E>>,
    pub(crate) jitter: Jitter,
    pub(crate) max_delay: Option<Duration>,
    pub(crate) error_sampling: f64,
}

impl<E> RetryPolicy<E> {
    /// Creates a policy that retries every error (until attempts/budget run
    /// out) with no jitter, no delay cap, and no delay multiplier.
    pub fn new(interval_fn: Arc<dyn IntervalFunction>) -> Self {
        Self {
            interval_fn,
            retry_predicate: None,
            delay_multiplier: None,
            jitter: Jitter::Off,
            max_delay: None,
            error_sampling: 1.0,
        }
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn with_delay_multiplier(mut self, f: DelayMultiplier<E>) -> Self {
        self.delay_multiplier = Some(f);
        self
    }

    /// Sets the fraction of calls subject to retry at all; calls outside the
    /// sampled fraction get exactly one attempt regardless of how the
    /// request fails. Clamped to `[0.0, 1.0]`.
    pub fn with_error_sampling(mut self, fraction: f64) -> Self {
        self.error_sampling = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn error_sampling(&self) -> f64 {
        self.error_sampling
    }

    /// Returns `true` if `error` should trigger a retry attempt.
    ///
    /// With no predicate configured, every error is retryable (the
    /// caller decides retryability entirely through `maxAttempts` and the
    /// budget).
    pub fn should_retry(&self, error: &E) -> bool {
        match &self.retry_predicate {
            Some(predicate) => predicate(error),
            None => true,
        }
    }

    /// Computes the delay before the next attempt: base delay from the
    /// configured [`IntervalFunction`], scaled by the delay multiplier (if
    /// any), capped at `max_delay`, then jittered.
    pub fn next_backoff(&self, attempt: usize, error: &E) -> Duration {
        let mut delay = self.interval_fn.interval(attempt);

        if let Some(ref multiplier) = self.delay_multiplier {
            let factor = multiplier(error);
            if factor.is_finite() && factor >= 0.0 {
                delay = delay.mul_f64(factor);
            }
        }

        if let Some(max) = self.max_delay {
            delay = delay.min(max);
        }

        self.jitter.apply(delay)
    }
}
