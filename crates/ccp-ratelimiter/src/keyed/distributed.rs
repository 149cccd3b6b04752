//! Optional cluster-wide state for the keyed rate limiter.
//!
//! Absent a [`DistributedStorage`] implementation, [`super::KeyedRateLimiter`]
//! keeps all state process-local. Supplying one swaps the per-process
//! `Mutex<HashMap<..>>` registry for whatever atomic store the caller wires
//! up (e.g. Redis `INCR`/`SET EX`), enabling cluster-wide enforcement of the
//! same key across processes.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait DistributedStorage: Send + Sync {
    async fn get(&self, key: &str) -> Option<i64>;
    async fn set(&self, key: &str, value: i64, ttl: Duration);
    async fn increment(&self, key: &str, by: i64) -> i64;
    async fn decrement(&self, key: &str, by: i64) -> i64;
    async fn delete(&self, key: &str);
}
