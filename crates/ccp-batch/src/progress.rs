//! The progress object emitted on completion (and optionally mid-flight).

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub percentage: f64,
    pub estimated_time_remaining_ms: Option<u64>,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            failed: 0,
            percentage: 0.0,
            estimated_time_remaining_ms: None,
        }
    }

    pub fn update(&mut self, completed: usize, failed: usize, elapsed: Duration) {
        self.completed = completed;
        self.failed = failed;
        let done = completed + failed;
        self.percentage = if self.total == 0 { 100.0 } else { (done as f64 / self.total as f64) * 100.0 };

        self.estimated_time_remaining_ms = if done == 0 || done >= self.total {
            None
        } else {
            let per_op = elapsed.as_secs_f64() / done as f64;
            let remaining = (self.total - done) as f64 * per_op;
            Some((remaining * 1000.0) as u64)
        };
    }
}

pub type ProgressCallback = Box<dyn Fn(Progress) + Send + Sync>;
