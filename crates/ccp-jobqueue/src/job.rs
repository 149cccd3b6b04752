//! The job record and its supporting enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The ~12 job types the queue recognizes. New types should be added here
/// rather than accepted as free-form strings, so `enqueue` can validate
/// them before accepting a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    GenerateArticle,
    LlmSnippet,
    MineKeywords,
    GenerateImage,
    PollImageGeneration,
    PublishPost,
    SyncInventory,
    RecordArticleUsage,
    SendWebhook,
    ReconcileSubscription,
    RefreshEmbeddings,
    CleanupExpiredCache,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::GenerateArticle => "generate_article",
            JobType::LlmSnippet => "llm_snippet",
            JobType::MineKeywords => "mine_keywords",
            JobType::GenerateImage => "generate_image",
            JobType::PollImageGeneration => "poll_image_generation",
            JobType::PublishPost => "publish_post",
            JobType::SyncInventory => "sync_inventory",
            JobType::RecordArticleUsage => "record_article_usage",
            JobType::SendWebhook => "send_webhook",
            JobType::ReconcileSubscription => "reconcile_subscription",
            JobType::RefreshEmbeddings => "refresh_embeddings",
            JobType::CleanupExpiredCache => "cleanup_expired_cache",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A queued unit of work. Construction always goes through
/// [`crate::queue::JobQueue::enqueue`]; this type itself only enforces the
/// `attempts <= max_attempts` invariant via [`Self::record_attempt`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_type: JobType,
    pub payload: Value,
    pub priority: Priority,
    pub status: JobStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub scheduled_at: DateTime<Utc>,
    pub retry_delay_ms: Option<u64>,
    pub parent_batch_id: Option<String>,
    pub depends_on: Vec<String>,
    pub result: Option<Value>,
    pub result_cached: bool,
    pub job_hash: String,
    pub cache_key: Option<String>,
    pub cache_ttl_seconds: Option<i64>,
}

impl Job {
    /// Increments the attempt counter, clamped so it never exceeds
    /// `max_attempts`; returns whether another attempt is permitted.
    pub fn record_attempt(&mut self) -> bool {
        if self.attempts >= self.max_attempts {
            return false;
        }
        self.attempts += 1;
        true
    }

    pub fn mark_completed(&mut self, result: Value, cached: bool) {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.result_cached = cached;
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
    }
}
