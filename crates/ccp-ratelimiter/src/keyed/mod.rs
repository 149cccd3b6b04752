//! Per-key rate limiting: token bucket, leaky bucket, sliding window and
//! fixed window, each with an independent concurrency cap, short-TTL result
//! cache, and metrics. The crate root's [`crate::RateLimiterLayer`] remains
//! the original single-instance Tower middleware and is reused as-is where
//! a plain Tower service needs rate limiting without per-key state.

mod commerce;
mod distributed;
mod metrics;
mod state;

pub use commerce::{CommerceRateLimiter, GraphQlTier};
pub use distributed::DistributedStorage;
pub use metrics::KeyMetrics;

use state::{AlgorithmState, Admit, FixedWindow, LeakyBucket, SlidingWindow, TokenBucket};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Selects which per-key algorithm a [`KeyedRateLimiter`] uses.
#[derive(Debug, Clone)]
pub enum Algorithm {
    TokenBucket { max_requests: f64, window: Duration, burst: f64 },
    LeakyBucket { restore_rate: f64, burst: f64 },
    SlidingWindow { max_requests: usize, max_cost: f64, window: Duration },
    FixedWindow { max_requests: f64, window: Duration },
}

impl Algorithm {
    fn new_state(&self) -> Box<dyn AlgorithmState> {
        match *self {
            Algorithm::TokenBucket { max_requests, window, burst } => {
                Box::new(TokenBucket::new(max_requests, window, burst))
            }
            Algorithm::LeakyBucket { restore_rate, burst } => Box::new(LeakyBucket::new(restore_rate, burst)),
            Algorithm::SlidingWindow { max_requests, max_cost, window } => {
                Box::new(SlidingWindow::new(max_requests, max_cost, window))
            }
            Algorithm::FixedWindow { max_requests, window } => Box::new(FixedWindow::new(max_requests, window)),
        }
    }
}

struct KeyState {
    algorithm: Box<dyn AlgorithmState>,
    concurrency_current: usize,
    metrics: KeyMetrics,
    last_check: Option<(Instant, bool)>,
}

/// `checkLimit` rejection or acceptance, with enough detail for the caller
/// to decide whether to wait and retry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LimitDecision {
    Admitted,
    Rejected { wait: Duration },
    ConcurrencyExceeded,
}

const RESULT_CACHE_TTL: Duration = Duration::from_secs(1);

/// A rate limiter with independent state per string key, implementing the
/// token/leaky/sliding/fixed-window algorithms and a per-key concurrency
/// cap.
pub struct KeyedRateLimiter {
    algorithm: Algorithm,
    concurrency_cap: Option<usize>,
    keys: Mutex<HashMap<String, KeyState>>,
}

impl KeyedRateLimiter {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            concurrency_cap: None,
            keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_concurrency_cap(mut self, cap: usize) -> Self {
        self.concurrency_cap = Some(cap);
        self
    }

    /// Checks whether `key` may spend `cost` tokens right now. A short-TTL
    /// (~1s) result cache deduplicates back-to-back calls with the same
    /// key and admit/reject outcome.
    pub fn check_limit(&self, key: &str, cost: f64) -> LimitDecision {
        let now = Instant::now();
        let mut keys = self.keys.lock().unwrap();
        let entry = keys
            .entry(key.to_string())
            .or_insert_with(|| KeyState {
                algorithm: self.algorithm.new_state(),
                concurrency_current: 0,
                metrics: KeyMetrics::default(),
                last_check: None,
            });

        if let Some(cap) = self.concurrency_cap {
            if entry.concurrency_current >= cap {
                entry.metrics.record_reject();
                return LimitDecision::ConcurrencyExceeded;
            }
        }

        if let Some((at, admitted)) = entry.last_check {
            if now.saturating_duration_since(at) < RESULT_CACHE_TTL && admitted {
                return LimitDecision::Admitted;
            }
        }

        match entry.algorithm.check(now, cost) {
            Admit::Allowed => {
                entry.metrics.record_admit(Duration::ZERO, cost);
                entry.last_check = Some((now, true));
                if self.concurrency_cap.is_some() {
                    entry.concurrency_current += 1;
                    entry.metrics.enter_concurrency();
                }
                LimitDecision::Admitted
            }
            Admit::Wait(wait) => {
                entry.metrics.record_reject();
                entry.last_check = Some((now, false));
                LimitDecision::Rejected { wait }
            }
        }
    }

    /// Releases a concurrency slot acquired by an admitted [`Self::check_limit`]
    /// call. A no-op if no concurrency cap is configured.
    pub fn release(&self, key: &str) {
        if self.concurrency_cap.is_none() {
            return;
        }
        let mut keys = self.keys.lock().unwrap();
        if let Some(entry) = keys.get_mut(key) {
            entry.concurrency_current = entry.concurrency_current.saturating_sub(1);
            entry.metrics.exit_concurrency();
        }
    }

    /// Refunds `amount` tokens to `key`'s bucket (token/leaky bucket only).
    pub fn refund(&self, key: &str, amount: f64) {
        let mut keys = self.keys.lock().unwrap();
        if let Some(entry) = keys.get_mut(key) {
            entry.algorithm.refund(amount);
        }
    }

    /// Loops `check_limit` + sleep until admitted or `max_wait` elapses.
    /// Backoff between attempts grows ×1.5 up to 5s.
    pub async fn wait_for_token(&self, key: &str, max_wait: Duration, cost: f64) -> bool {
        let deadline = Instant::now() + max_wait;
        let mut backoff = Duration::from_millis(10);
        const MAX_BACKOFF: Duration = Duration::from_secs(5);

        loop {
            match self.check_limit(key, cost) {
                LimitDecision::Admitted => return true,
                LimitDecision::Rejected { .. } | LimitDecision::ConcurrencyExceeded => {
                    if Instant::now() >= deadline {
                        return false;
                    }
                    let jitter = Duration::from_millis(rand::random::<u64>() % 50);
                    let sleep_for = backoff.min(MAX_BACKOFF) + jitter;
                    if Instant::now() + sleep_for > deadline {
                        return false;
                    }
                    sleep(sleep_for).await;
                    backoff = backoff.mul_f64(1.5).min(MAX_BACKOFF);
                }
            }
        }
    }

    /// A snapshot of the metrics tracked for `key`, if it has ever been
    /// checked.
    pub fn metrics_for(&self, key: &str) -> Option<MetricsSnapshot> {
        let keys = self.keys.lock().unwrap();
        keys.get(key).map(|entry| MetricsSnapshot {
            total_requests: entry.metrics.total_requests,
            total_rejected: entry.metrics.total_rejected,
            rejection_rate: entry.metrics.rejection_rate(),
            average_wait: entry.metrics.average_wait(),
            average_cost: entry.metrics.average_cost(),
            concurrency_current: entry.metrics.concurrency_current,
            concurrency_peak: entry.metrics.concurrency_peak,
        })
    }

    pub fn tokens_remaining(&self, key: &str) -> Option<f64> {
        let keys = self.keys.lock().unwrap();
        keys.get(key).map(|entry| entry.algorithm.tokens_remaining())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_rejected: u64,
    pub rejection_rate: f64,
    pub average_wait: Duration,
    pub average_cost: f64,
    pub concurrency_current: usize,
    pub concurrency_peak: usize,
}
