//! A tiny per-key TTL cache shared by the billing and embedding caches.
//! Deliberately not the generic `ccp-cache` Tower layer: those caches sit in
//! front of plain async method calls rather than a `tower::Service`, and
//! `ccp-cache::CacheStore` is private to its own crate.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

struct Entry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

pub(crate) struct TtlCache<T: Clone> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl }
    }

    pub(crate) fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(key)?;
        if entry.expires_at < Utc::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    pub(crate) fn set(&self, key: impl Into<String>, value: T) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.into(), Entry { value, expires_at: Utc::now() + self.ttl });
    }
}
