//! Per-key algorithm state: token bucket, leaky bucket, sliding window and
//! fixed window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A single entry in the sliding-window history, timestamped with its cost.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HistoryEntry {
    pub at: Instant,
    pub cost: f64,
}

/// Outcome of a single `check` against one key's algorithm state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Admit {
    Allowed,
    /// Caller should wait this long before retrying.
    Wait(Duration),
}

pub(crate) trait AlgorithmState: Send {
    fn check(&mut self, now: Instant, cost: f64) -> Admit;
    /// Refunds `amount` tokens back to the bucket (token/leaky bucket only;
    /// a no-op for window-based algorithms). Never exceeds burst.
    fn refund(&mut self, amount: f64);
    fn tokens_remaining(&self) -> f64;
}

/// `tokens = min(burst, tokens + floor((elapsed / window_ms) * max_requests))`
#[derive(Debug)]
pub(crate) struct TokenBucket {
    pub max_requests: f64,
    pub window: Duration,
    pub burst: f64,
    pub tokens: f64,
    pub last_refill: Instant,
}

impl TokenBucket {
    pub fn new(max_requests: f64, window: Duration, burst: f64) -> Self {
        Self {
            max_requests,
            window,
            burst,
            tokens: burst,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        if elapsed.is_zero() {
            return;
        }
        let refilled = (elapsed.as_secs_f64() / self.window.as_secs_f64()) * self.max_requests;
        self.tokens = (self.tokens + refilled.floor()).min(self.burst);
        self.last_refill = now;
    }
}

impl AlgorithmState for TokenBucket {
    fn check(&mut self, now: Instant, cost: f64) -> Admit {
        self.refill(now);
        if self.tokens >= cost {
            self.tokens -= cost;
            Admit::Allowed
        } else {
            let deficit = cost - self.tokens;
            let wait_secs = (deficit / self.max_requests) * self.window.as_secs_f64();
            Admit::Wait(Duration::from_secs_f64(wait_secs.max(0.0)))
        }
    }

    fn refund(&mut self, amount: f64) {
        self.tokens = (self.tokens + amount).min(self.burst);
    }

    fn tokens_remaining(&self) -> f64 {
        self.tokens
    }
}

/// `tokens = min(burst, tokens + elapsed_seconds * restore_rate)`
#[derive(Debug)]
pub(crate) struct LeakyBucket {
    pub restore_rate: f64,
    pub burst: f64,
    pub tokens: f64,
    pub last_refill: Instant,
}

impl LeakyBucket {
    pub fn new(restore_rate: f64, burst: f64) -> Self {
        Self {
            restore_rate,
            burst,
            tokens: burst,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed <= 0.0 {
            return;
        }
        self.tokens = (self.tokens + elapsed * self.restore_rate).min(self.burst);
        self.last_refill = now;
    }
}

impl AlgorithmState for LeakyBucket {
    fn check(&mut self, now: Instant, cost: f64) -> Admit {
        self.refill(now);
        if self.tokens >= cost {
            self.tokens -= cost;
            Admit::Allowed
        } else {
            let deficit = cost - self.tokens;
            let wait_secs = deficit / self.restore_rate;
            Admit::Wait(Duration::from_secs_f64(wait_secs.max(0.0)))
        }
    }

    fn refund(&mut self, amount: f64) {
        self.tokens = (self.tokens + amount).min(self.burst);
    }

    fn tokens_remaining(&self) -> f64 {
        self.tokens
    }
}

/// Admits iff count and summed cost within `[now - window, now]` are both
/// under the configured limits; trims the history on every check.
#[derive(Debug)]
pub(crate) struct SlidingWindow {
    pub max_requests: usize,
    pub max_cost: f64,
    pub window: Duration,
    pub history: VecDeque<HistoryEntry>,
}

impl SlidingWindow {
    pub fn new(max_requests: usize, max_cost: f64, window: Duration) -> Self {
        Self {
            max_requests,
            max_cost,
            window,
            history: VecDeque::new(),
        }
    }

    fn trim(&mut self, now: Instant) {
        while let Some(front) = self.history.front() {
            if now.saturating_duration_since(front.at) > self.window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}

impl AlgorithmState for SlidingWindow {
    fn check(&mut self, now: Instant, cost: f64) -> Admit {
        self.trim(now);

        let count = self.history.len();
        let total_cost: f64 = self.history.iter().map(|e| e.cost).sum();

        if count < self.max_requests && total_cost + cost <= self.max_cost {
            self.history.push_back(HistoryEntry { at: now, cost });
            Admit::Allowed
        } else {
            let oldest = self.history.front().map(|e| e.at).unwrap_or(now);
            let wait = (oldest + self.window).saturating_duration_since(now);
            Admit::Wait(wait)
        }
    }

    fn refund(&mut self, _amount: f64) {}

    fn tokens_remaining(&self) -> f64 {
        (self.max_requests.saturating_sub(self.history.len())) as f64
    }
}

/// Window bucket is `floor(now / window_ms) * window_ms`; resets on
/// boundary crossing.
#[derive(Debug)]
pub(crate) struct FixedWindow {
    pub max_requests: f64,
    pub window: Duration,
    pub epoch: Instant,
    pub current_bucket: u64,
    pub used: f64,
}

impl FixedWindow {
    pub fn new(max_requests: f64, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            epoch: Instant::now(),
            current_bucket: 0,
            used: 0.0,
        }
    }

    fn bucket_for(&self, now: Instant) -> u64 {
        let elapsed_ms = now.saturating_duration_since(self.epoch).as_millis() as u64;
        let window_ms = self.window.as_millis().max(1) as u64;
        elapsed_ms / window_ms
    }
}

impl AlgorithmState for FixedWindow {
    fn check(&mut self, now: Instant, cost: f64) -> Admit {
        let bucket = self.bucket_for(now);
        if bucket != self.current_bucket {
            self.current_bucket = bucket;
            self.used = 0.0;
        }

        if self.used + cost <= self.max_requests {
            self.used += cost;
            Admit::Allowed
        } else {
            let window_ms = self.window.as_millis() as u64;
            let next_boundary_ms = (bucket + 1) * window_ms;
            let elapsed_ms = now.saturating_duration_since(self.epoch).as_millis() as u64;
            let wait_ms = next_boundary_ms.saturating_sub(elapsed_ms);
            Admit::Wait(Duration::from_millis(wait_ms))
        }
    }

    fn refund(&mut self, amount: f64) {
        self.used = (self.used - amount).max(0.0);
    }

    fn tokens_remaining(&self) -> f64 {
        (self.max_requests - self.used).max(0.0)
    }
}
