//! Append-only audit log. Every audit write is best-effort: a failure here
//! is logged and swallowed, never surfaced to the caller.

use ccp_core::store::{DataStore, LogLevel, LogLine, Row};
use chrono::Utc;
use serde_json::{json, Value};

pub const AUDIT_TABLE: &str = "plan_audit_log";

pub async fn record_audit(store: &dyn DataStore, store_id: &str, event_type: &str, metadata: Value) {
    let mut row = Row::new();
    row.insert("store_id".into(), json!(store_id));
    row.insert("event_type".into(), json!(event_type));
    row.insert("metadata".into(), metadata);
    row.insert("created_at".into(), json!(Utc::now().to_rfc3339()));

    if let Err(err) = store.insert(AUDIT_TABLE, row).await {
        LogLine::new(LogLevel::Warn, "ccp-quota", "audit write failed")
            .with_context("store_id", store_id)
            .with_context("event_type", event_type)
            .with_context("error", err.to_string())
            .emit();
    }
}
