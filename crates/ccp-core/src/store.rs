//! The data-store contract the control plane depends on.
//!
//! The relational store itself is out of scope: every
//! subsystem that needs to read or write rows — the job queue, the quota
//! manager, the batch executor — depends on this trait rather than any
//! concrete database client. A test double or an `sqlx`-backed adapter can
//! both implement it; the core never cares which.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// A single equality/comparison predicate in a [`Filter`].
#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Value),
    In(Vec<Value>),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Like(String),
    ILike(String),
}

/// A composable filter expression: a conjunction of column predicates, with
/// an explicit `or` group for alternatives: equality, `in`, range,
/// `like`/`ilike`, and `or`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub predicates: Vec<(String, FilterOp)>,
    pub or_groups: Vec<Vec<(String, FilterOp)>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push((column.into(), FilterOp::Eq(value.into())));
        self
    }

    pub fn is_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.predicates.push((column.into(), FilterOp::In(values)));
        self
    }

    pub fn or(mut self, group: Vec<(String, FilterOp)>) -> Self {
        self.or_groups.push(group);
        self
    }
}

/// Ordering and pagination for read operations.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub order_by: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// A single row as a loosely-typed JSON object, the shape every `DataStore`
/// operation exchanges. Mirrors the "dynamic JSON responses" design note:
/// callers clamp/validate the fields they expect rather than relying on a
/// schema the store enforces.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    #[error("unique constraint violated on {constraint}")]
    UniqueViolation { constraint: String },
    #[error("store operation failed: {0}")]
    Backend(String),
}

/// The narrow repository surface every control-plane subsystem depends on.
///
/// Implementations back this with whatever store they like (Postgres,
/// an in-memory map for tests); the core only ever calls these methods.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn insert(&self, table: &str, data: Row) -> Result<Row, StoreError>;
    async fn update(&self, table: &str, filter: &Filter, data: Row) -> Result<Vec<Row>, StoreError>;
    async fn upsert(&self, table: &str, conflict_columns: &[&str], data: Row) -> Result<Row, StoreError>;
    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;
    async fn select(&self, table: &str, filter: &Filter, page: &Page) -> Result<Vec<Row>, StoreError>;

    /// `job_hash_exists(hash, window_minutes)`: true if an un-expired job
    /// with this content hash was created within the dedup window.
    async fn job_hash_exists(&self, hash: &str, window_minutes: i64) -> Result<Option<Row>, StoreError>;

    /// `increment_batch_total(batch_id)`.
    async fn increment_batch_total(&self, batch_id: &str) -> Result<(), StoreError>;

    /// `get_store_quota_status(store_id)`.
    async fn get_store_quota_status(&self, store_id: &str) -> Result<Option<Row>, StoreError>;

    /// `record_article_usage(store_id, post_id, usage_type)`.
    async fn record_article_usage(&self, store_id: &str, post_id: &str, usage_type: &str) -> Result<(), StoreError>;

    /// `record_subscription_event(...)`.
    async fn record_subscription_event(&self, store_id: &str, event: Row) -> Result<(), StoreError>;

    /// `record_payment(...)`.
    async fn record_payment(&self, store_id: &str, payment: Row) -> Result<(), StoreError>;

    /// `sync_plan_limits_to_store(store_id, new_plan_id)`. Failure here is
    /// logged, never fatal — callers must swallow the error.
    async fn sync_plan_limits_to_store(&self, store_id: &str, new_plan_id: &str) -> Result<(), StoreError>;
}

/// A structured log line: `{level, service, message, timestamp,
/// ...context}`, written line-delimited JSON, errors to stderr, everything
/// else to stdout.
///
/// The core crates never install a global subscriber (library, not binary);
/// this type exists so callers that don't already run `tracing-subscriber`
/// with a JSON formatter can still get this exact shape.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: LogLevel,
    pub service: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub context: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl LogLine {
    pub fn new(level: LogLevel, service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            service: service.into(),
            message: message.into(),
            timestamp: Utc::now(),
            context: serde_json::Map::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Renders the line as a JSON object and writes it to
    /// stdout (or stderr for `Error`/`Warn`).
    pub fn emit(self) {
        let mut obj = serde_json::Map::new();
        obj.insert("level".into(), Value::String(self.level.to_string()));
        obj.insert("service".into(), Value::String(self.service));
        obj.insert("message".into(), Value::String(self.message));
        obj.insert("timestamp".into(), Value::String(self.timestamp.to_rfc3339()));
        for (k, v) in self.context {
            obj.insert(k, v);
        }
        let line = Value::Object(obj).to_string();
        match self.level {
            LogLevel::Error | LogLevel::Warn => eprintln!("{line}"),
            LogLevel::Debug | LogLevel::Info => println!("{line}"),
        }
    }
}
