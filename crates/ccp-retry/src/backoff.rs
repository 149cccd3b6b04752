//! Pluggable per-attempt delay strategies.
//!
//! Every strategy implements [`IntervalFunction`], which maps a zero-indexed
//! attempt number (0 = the delay before the first retry) to a base delay.
//! Rate-limit/timeout multipliers, the `maxDelay` cap and jitter are applied
//! afterwards by [`crate::policy::RetryPolicy::next_backoff`], not here, so
//! strategies stay simple and composable.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Computes the base delay before a given retry attempt.
pub trait IntervalFunction: Send + Sync {
    /// Returns the delay before retry number `attempt` (0-indexed: `attempt
    /// == 0` is the delay before the first retry, i.e. after the initial
    /// call's first failure).
    fn interval(&self, attempt: usize) -> Duration;
}

/// Constant delay between every attempt.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn interval(&self, _attempt: usize) -> Duration {
        self.duration
    }
}

/// `initial * multiplier^attempt`, the default strategy (multiplier 2.0).
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    initial: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Overrides the default multiplier of `2.0`.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the computed delay at `max_interval`.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn interval(&self, attempt: usize) -> Duration {
        let factor = self.multiplier.powi(attempt as i32);
        let delay = self.initial.mul_f64(factor.max(0.0));
        match self.max_interval {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

/// Exponential backoff with a randomization factor applied to each delay,
/// e.g. a factor of `0.5` draws the delay uniformly from `[base*0.5, base*1.5]`.
#[derive(Debug, Clone)]
pub struct ExponentialRandomBackoff {
    initial: Duration,
    multiplier: f64,
    randomization_factor: f64,
    max_interval: Option<Duration>,
}

impl ExponentialRandomBackoff {
    pub fn new(initial: Duration, randomization_factor: f64) -> Self {
        Self {
            initial,
            multiplier: 2.0,
            randomization_factor: randomization_factor.clamp(0.0, 1.0),
            max_interval: None,
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Caps the computed delay (before randomization is applied) at
    /// `max_interval`.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn interval(&self, attempt: usize) -> Duration {
        let mut base = self.initial.mul_f64(self.multiplier.powi(attempt as i32).max(0.0));
        if let Some(max) = self.max_interval {
            base = base.min(max);
        }
        let spread = base.mul_f64(self.randomization_factor);
        let low = base.saturating_sub(spread);
        let jitter_range = spread.as_secs_f64() * 2.0;
        let offset = if jitter_range > 0.0 {
            rand::random::<f64>() * jitter_range
        } else {
            0.0
        };
        low + Duration::from_secs_f64(offset)
    }
}

/// `initial + step * attempt`.
#[derive(Debug, Clone, Copy)]
pub struct LinearBackoff {
    initial: Duration,
    step: Duration,
}

impl LinearBackoff {
    pub fn new(initial: Duration, step: Duration) -> Self {
        Self { initial, step }
    }
}

impl IntervalFunction for LinearBackoff {
    fn interval(&self, attempt: usize) -> Duration {
        self.initial + self.step * attempt as u32
    }
}

/// `initial * (attempt + 1)^exponent`.
#[derive(Debug, Clone, Copy)]
pub struct PolynomialBackoff {
    initial: Duration,
    exponent: f64,
}

impl PolynomialBackoff {
    pub fn new(initial: Duration, exponent: f64) -> Self {
        Self { initial, exponent }
    }
}

impl IntervalFunction for PolynomialBackoff {
    fn interval(&self, attempt: usize) -> Duration {
        let factor = ((attempt + 1) as f64).powf(self.exponent);
        self.initial.mul_f64(factor.max(0.0))
    }
}

/// A user-supplied delay function. Must return a delay `>= 0`; the function
/// is trusted, not validated (a buggy closure that returns ever-shrinking
/// delays is the caller's bug, not the retry engine's).
#[derive(Clone)]
pub struct FnInterval {
    f: Arc<dyn Fn(usize) -> Duration + Send + Sync>,
}

impl FnInterval {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(usize) -> Duration + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }
}

impl fmt::Debug for FnInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterval").finish_non_exhaustive()
    }
}

impl IntervalFunction for FnInterval {
    fn interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}

/// How much random slack to add on top of the strategy's base delay.
#[derive(Debug, Clone, Copy, Default)]
pub enum Jitter {
    /// No jitter.
    #[default]
    Off,
    /// Always add a fixed extra delay.
    Fixed(Duration),
    /// Add a uniformly distributed extra delay in `[0, max)`.
    AdditiveUniform(Duration),
}

impl Jitter {
    pub(crate) fn apply(&self, base: Duration) -> Duration {
        match self {
            Jitter::Off => base,
            Jitter::Fixed(extra) => base + *extra,
            Jitter::AdditiveUniform(max) => {
                if max.is_zero() {
                    return base;
                }
                let extra = Duration::from_secs_f64(rand::random::<f64>() * max.as_secs_f64());
                base + extra
            }
        }
    }
}
