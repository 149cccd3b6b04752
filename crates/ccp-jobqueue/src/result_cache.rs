//! Result cache: short-circuits re-enqueue of a job whose result is already
//! known, keyed by an explicit cache key or by `(type, payload_hash)`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct ResultCacheEntry {
    pub key: String,
    pub job_type: String,
    pub payload_hash: String,
    pub result: Value,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
    pub last_accessed: DateTime<Utc>,
}

/// An in-process result cache. A `DataStore`-backed implementation would
/// read/write the same logical rows; this type models the bookkeeping
/// rules (expiry visibility, best-effort hit counting) so a caller wired to
/// any storage backend gets them for free.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<String, ResultCacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entry: ResultCacheEntry) {
        self.entries.lock().unwrap().insert(entry.key.clone(), entry);
    }

    /// Looks up `key`, returning `None` for missing or expired entries
    /// (expired rows are invisible to readers).
    /// A successful read is a cache hit: `hit_count` and `last_accessed`
    /// are updated best-effort (failures here would never fail the caller).
    pub fn get(&self, key: &str) -> Option<ResultCacheEntry> {
        let mut entries = self.entries.lock().unwrap();
        let now = Utc::now();
        let entry = entries.get_mut(key)?;
        if entry.expires_at < now {
            return None;
        }
        entry.hit_count += 1;
        entry.last_accessed = now;
        Some(entry.clone())
    }

    /// Looks up by `(job_type, payload_hash)` rather than an explicit key,
    /// used when the caller never supplied a standalone `cacheKey`.
    pub fn get_by_type_and_hash(&self, job_type: &str, payload_hash: &str) -> Option<ResultCacheEntry> {
        let key = {
            let entries = self.entries.lock().unwrap();
            entries
                .values()
                .find(|e| e.job_type == job_type && e.payload_hash == payload_hash)
                .map(|e| e.key.clone())
        }?;
        self.get(&key)
    }
}
