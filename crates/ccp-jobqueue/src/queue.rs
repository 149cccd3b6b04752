//! `enqueue`: the job queue's single write path, in five steps
//! (validate, hash, dedup, cache short-circuit, insert).

use crate::hash::job_hash;
use crate::job::{JobStatus, JobType, Priority};
use crate::result_cache::{ResultCache, ResultCacheEntry};
use ccp_core::store::{DataStore, Row};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const MAX_ATTEMPTS_BOUND: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    #[error("payload must be a JSON object")]
    InvalidPayload,
    #[error("max_attempts must be in 1..=100")]
    InvalidMaxAttempts,
    #[error("store error: {0}")]
    Store(#[from] ccp_core::store::StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct EnqueueOptions {
    pub priority: Priority,
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub retry_delay_ms: Option<u64>,
    pub depends_on: Vec<String>,
    pub batch_id: Option<String>,
    pub cache_key: Option<String>,
    pub cache_ttl_seconds: Option<i64>,
    pub deduplication_key: Option<String>,
    pub skip_if_duplicate: bool,
    pub dedup_window_minutes: Option<i64>,
}

impl EnqueueOptions {
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            ..Default::default()
        }
    }
}

/// What `enqueue` returned: a fresh pending job, a short-circuited
/// cache hit, or an existing job id (dedup skip/no-reinsert path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Inserted { job_id: String },
    CacheHit { job_id: String },
    ExistingDuplicate { job_id: String },
}

impl EnqueueOutcome {
    pub fn job_id(&self) -> &str {
        match self {
            EnqueueOutcome::Inserted { job_id }
            | EnqueueOutcome::CacheHit { job_id }
            | EnqueueOutcome::ExistingDuplicate { job_id } => job_id,
        }
    }
}

pub struct JobQueue {
    store: Arc<dyn DataStore>,
    result_cache: Arc<ResultCache>,
}

impl JobQueue {
    pub fn new(store: Arc<dyn DataStore>, result_cache: Arc<ResultCache>) -> Self {
        Self { store, result_cache }
    }

    pub async fn enqueue(
        &self,
        job_type: JobType,
        payload: Value,
        options: EnqueueOptions,
    ) -> Result<EnqueueOutcome, JobQueueError> {
        if !payload.is_object() && !payload.is_null() {
            return Err(JobQueueError::InvalidPayload);
        }
        if options.max_attempts == 0 || options.max_attempts > MAX_ATTEMPTS_BOUND {
            return Err(JobQueueError::InvalidMaxAttempts);
        }

        let hash = options
            .deduplication_key
            .clone()
            .unwrap_or_else(|| job_hash(job_type.as_str(), &payload));

        let dedup_active = options.deduplication_key.is_some() || options.dedup_window_minutes.is_some();
        let window_minutes = options.dedup_window_minutes.unwrap_or(60);

        if dedup_active {
            if let Some(existing) = self.store.job_hash_exists(&hash, window_minutes).await? {
                let existing_id = row_string(&existing, "id").unwrap_or_default();

                if options.skip_if_duplicate {
                    return Ok(EnqueueOutcome::ExistingDuplicate { job_id: existing_id });
                }

                if let Some(cached) = self.lookup_cache(&options, job_type, &payload).await {
                    let job_id = self.insert_cache_hit_row(job_type, &payload, &hash, &options, cached).await?;
                    return Ok(EnqueueOutcome::CacheHit { job_id });
                }

                return Ok(EnqueueOutcome::ExistingDuplicate { job_id: existing_id });
            }
        }

        if options.cache_key.is_some() && !dedup_active {
            if let Some(cached) = self.lookup_cache(&options, job_type, &payload).await {
                let job_id = self.insert_cache_hit_row(job_type, &payload, &hash, &options, cached).await?;
                return Ok(EnqueueOutcome::CacheHit { job_id });
            }
        }

        let job_id = self.insert_pending_row(job_type, &payload, &hash, &options).await?;
        Ok(EnqueueOutcome::Inserted { job_id })
    }

    async fn lookup_cache(&self, options: &EnqueueOptions, job_type: JobType, payload: &Value) -> Option<Value> {
        if let Some(ref key) = options.cache_key {
            return self.result_cache.get(key).map(|e| e.result);
        }
        let payload_hash = job_hash(job_type.as_str(), payload);
        self.result_cache
            .get_by_type_and_hash(job_type.as_str(), &payload_hash)
            .map(|e| e.result)
    }

    async fn insert_cache_hit_row(
        &self,
        job_type: JobType,
        _payload: &Value,
        hash: &str,
        options: &EnqueueOptions,
        result: Value,
    ) -> Result<String, JobQueueError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("job_type".into(), json!(job_type.as_str()));
        row.insert("job_hash".into(), json!(hash));
        row.insert("status".into(), json!(status_str(JobStatus::Completed)));
        row.insert("result".into(), result);
        row.insert("result_cached".into(), json!(true));
        row.insert("created_at".into(), json!(now.to_rfc3339()));
        row.insert("completed_at".into(), json!(now.to_rfc3339()));
        row.insert("priority".into(), json!(priority_str(options.priority)));

        self.store.insert("job_queue", row).await?;
        Ok(id)
    }

    async fn insert_pending_row(
        &self,
        job_type: JobType,
        payload: &Value,
        hash: &str,
        options: &EnqueueOptions,
    ) -> Result<String, JobQueueError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let scheduled_at = if options.delay_ms > 0 {
            now + ChronoDuration::milliseconds(options.delay_ms as i64)
        } else {
            now
        };

        let mut row = Row::new();
        row.insert("id".into(), json!(id));
        row.insert("job_type".into(), json!(job_type.as_str()));
        row.insert("payload".into(), payload.clone());
        row.insert("job_hash".into(), json!(hash));
        row.insert("status".into(), json!(status_str(JobStatus::Pending)));
        row.insert("priority".into(), json!(priority_str(options.priority)));
        row.insert("attempts".into(), json!(0));
        row.insert("max_attempts".into(), json!(options.max_attempts));
        row.insert("created_at".into(), json!(now.to_rfc3339()));
        row.insert("scheduled_at".into(), json!(scheduled_at.to_rfc3339()));
        if let Some(delay) = options.retry_delay_ms {
            row.insert("retry_delay_ms".into(), json!(delay));
        }
        if !options.depends_on.is_empty() {
            row.insert("depends_on".into(), json!(options.depends_on));
        }
        if let Some(ref batch_id) = options.batch_id {
            row.insert("batch_id".into(), json!(batch_id));
        }
        if let Some(ref cache_key) = options.cache_key {
            row.insert("cache_key".into(), json!(cache_key));
        }
        if let Some(ttl) = options.cache_ttl_seconds {
            row.insert("cache_ttl_seconds".into(), json!(ttl));
        }

        self.store.insert("job_queue", row).await?;

        if let Some(ref batch_id) = options.batch_id {
            let _ = self.store.increment_batch_total(batch_id).await;
        }

        Ok(id)
    }

    /// Best-effort: preloads a result into the cache ahead of an enqueue
    /// that is expected to hit it.
    pub fn preload_cache(&self, entry: ResultCacheEntry) {
        self.result_cache.insert(entry);
    }
}

fn status_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    }
}

fn priority_str(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Normal => "normal",
        Priority::High => "high",
        Priority::Critical => "critical",
    }
}

fn row_string(row: &Row, key: &str) -> Option<String> {
    row.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
