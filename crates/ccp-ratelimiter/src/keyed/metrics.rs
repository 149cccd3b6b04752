//! Per-key metrics: totals, rejection rate, running average wait/cost,
//! concurrency current/peak, and a bounded ring of recent window summaries.

use std::collections::VecDeque;
use std::time::Duration;

const RING_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowSummary {
    pub admitted: u64,
    pub rejected: u64,
}

#[derive(Debug, Default)]
pub struct KeyMetrics {
    pub total_requests: u64,
    pub total_rejected: u64,
    pub total_wait: Duration,
    pub total_cost: f64,
    pub concurrency_current: usize,
    pub concurrency_peak: usize,
    pub recent_windows: VecDeque<WindowSummary>,
}

impl KeyMetrics {
    pub fn record_admit(&mut self, wait: Duration, cost: f64) {
        self.total_requests += 1;
        self.total_wait += wait;
        self.total_cost += cost;
        self.push_summary(true);
    }

    pub fn record_reject(&mut self) {
        self.total_requests += 1;
        self.total_rejected += 1;
        self.push_summary(false);
    }

    fn push_summary(&mut self, admitted: bool) {
        if self.recent_windows.len() == RING_CAPACITY {
            self.recent_windows.pop_front();
        }
        let mut summary = WindowSummary::default();
        if admitted {
            summary.admitted = 1;
        } else {
            summary.rejected = 1;
        }
        self.recent_windows.push_back(summary);
    }

    pub fn rejection_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_rejected as f64 / self.total_requests as f64
        }
    }

    pub fn average_wait(&self) -> Duration {
        if self.total_requests == 0 {
            Duration::ZERO
        } else {
            self.total_wait / self.total_requests as u32
        }
    }

    pub fn average_cost(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_cost / self.total_requests as f64
        }
    }

    pub fn enter_concurrency(&mut self) {
        self.concurrency_current += 1;
        self.concurrency_peak = self.concurrency_peak.max(self.concurrency_current);
    }

    pub fn exit_concurrency(&mut self) {
        self.concurrency_current = self.concurrency_current.saturating_sub(1);
    }
}
