//! Batch-level configuration: strategy and transaction/rollback toggles.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Parallel,
    Smart,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Smart
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub strategy: Strategy,
    pub enable_transactions: bool,
    pub enable_rollback: bool,
    pub dependency_poll_interval: Duration,
    pub dependency_timeout: Duration,
    pub global_timeout: Option<Duration>,
    /// Batch-level retry ceiling; an operation's own override takes
    /// precedence when set.
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            enable_transactions: true,
            enable_rollback: false,
            dependency_poll_interval: Duration::from_millis(100),
            dependency_timeout: Duration::from_secs(30),
            global_timeout: None,
            retry_max_attempts: 1,
            retry_base_delay: Duration::from_millis(50),
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.enable_rollback = enabled;
        self
    }

    pub fn with_transactions(mut self, enabled: bool) -> Self {
        self.enable_transactions = enabled;
        self
    }

    pub fn with_global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = Some(timeout);
        self
    }

    pub fn with_retry_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry_max_attempts = max_attempts;
        self
    }
}
