//! Bounded TTL cache for classification results, keyed by
//! `(status, code, message[:100])`.
//!
//! A module-load-global cleanup interval for this cache doesn't translate
//! cleanly to Rust's ownership model. Here the cleaner is lifecycle-bound
//! to the [`ClassificationCache`] instance instead: it runs lazily, on
//! access, rather than on a free-running background task, so dropping the
//! cache stops the cleanup too.

use crate::{classify, Classification, ErrorHints};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const MAX_MESSAGE_KEY_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    status: Option<u16>,
    code: Option<String>,
    message_prefix: String,
}

struct Entry {
    classification: Classification,
    inserted_at: Instant,
}

/// A classifier with a bounded, TTL-expiring memo of prior results.
pub struct ClassificationCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<CacheKey, Entry>>,
    insertion_order: Mutex<Vec<CacheKey>>,
}

impl ClassificationCache {
    /// `max_entries` bounds memory; oldest entries are evicted first once
    /// the bound is hit, same as the retry dedup map's ~1000-entry cap.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: Mutex::new(HashMap::new()),
            insertion_order: Mutex::new(Vec::new()),
        }
    }

    /// Classifies `hints`, serving a cached result if one exists and hasn't
    /// expired, running the full rule chain and caching the result
    /// otherwise. Expired entries are swept opportunistically on every call.
    pub fn classify(&self, hints: &ErrorHints<'_>) -> Classification {
        let key = CacheKey {
            status: hints.status,
            code: hints.code.map(str::to_owned),
            message_prefix: hints.message.chars().take(MAX_MESSAGE_KEY_LEN).collect(),
        };

        self.cleanup_expired();

        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(&key) {
                if entry.inserted_at.elapsed() < self.ttl {
                    return entry.classification.clone();
                }
            }
        }

        let classification = classify(hints);
        self.insert(key, classification.clone());
        classification
    }

    fn insert(&self, key: CacheKey, classification: Classification) {
        let mut entries = self.entries.lock().unwrap();
        let mut order = self.insertion_order.lock().unwrap();

        if !entries.contains_key(&key) {
            order.push(key.clone());
        }
        entries.insert(
            key,
            Entry {
                classification,
                inserted_at: Instant::now(),
            },
        );

        while entries.len() > self.max_entries {
            if order.is_empty() {
                break;
            }
            let oldest = order.remove(0);
            entries.remove(&oldest);
        }
    }

    fn cleanup_expired(&self) {
        let mut entries = self.entries.lock().unwrap();
        let mut order = self.insertion_order.lock().unwrap();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        order.retain(|key| entries.contains_key(key));
    }

    /// Number of live (possibly stale, pre-cleanup) entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClassificationCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), 1000)
    }
}
