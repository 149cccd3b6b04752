//! The distributed lock table: `plan_operation_locks(store_id, operation,
//! expires_at, correlation_id)`, unique on `(store_id, operation)`.
//!
//! Three operations are lock-separated and never block each other:
//! [`LockOperation::QuotaCheck`], [`LockOperation::PlanUpdate`],
//! [`LockOperation::TrialUpdate`].

use ccp_core::store::{DataStore, Filter, FilterOp, Page, Row, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;

pub const LOCK_TABLE: &str = "plan_operation_locks";
pub const LOCK_TTL_SECONDS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOperation {
    QuotaCheck,
    PlanUpdate,
    TrialUpdate,
}

impl LockOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockOperation::QuotaCheck => "quota_check",
            LockOperation::PlanUpdate => "plan_update",
            LockOperation::TrialUpdate => "trial_update",
        }
    }
}

pub struct LockManager {
    store: Arc<dyn DataStore>,
}

impl LockManager {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn lock_filter(store_id: &str, op: LockOperation) -> Filter {
        Filter::new().eq("store_id", store_id).eq("operation", op.as_str())
    }

    /// Step 1: insert. On unique-constraint conflict, step 2: read the
    /// current holder — if its lease hasn't expired, fail. Step 3:
    /// otherwise a conditional update (`WHERE expires_at < now`) takes the
    /// lock over; success is judged by whether any row was actually
    /// updated, so two racing takeovers can't both believe they won.
    pub async fn acquire(
        &self,
        store_id: &str,
        op: LockOperation,
        correlation_id: &str,
    ) -> Result<bool, StoreError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(LOCK_TTL_SECONDS);

        let mut row = Row::new();
        row.insert("store_id".into(), json!(store_id));
        row.insert("operation".into(), json!(op.as_str()));
        row.insert("correlation_id".into(), json!(correlation_id));
        row.insert("expires_at".into(), json!(expires_at.to_rfc3339()));

        match self.store.insert(LOCK_TABLE, row).await {
            Ok(_) => Ok(true),
            Err(StoreError::UniqueViolation { .. }) => self.try_takeover(store_id, op, correlation_id, now, expires_at).await,
            Err(e) => Err(e),
        }
    }

    async fn try_takeover(
        &self,
        store_id: &str,
        op: LockOperation,
        correlation_id: &str,
        now: DateTime<Utc>,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let existing = self
            .store
            .select(LOCK_TABLE, &Self::lock_filter(store_id, op), &Page::default())
            .await?;

        let Some(current) = existing.first() else {
            // Row vanished between the failed insert and this read; treat
            // the lock as contended rather than racing another insert.
            return Ok(false);
        };

        let current_expiry = current
            .get("expires_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        if let Some(expiry) = current_expiry {
            if expiry > now {
                return Ok(false);
            }
        }

        let mut condition = Self::lock_filter(store_id, op);
        condition.predicates.push(("expires_at".into(), FilterOp::Lt(json!(now.to_rfc3339()))));

        let mut patch = Row::new();
        patch.insert("correlation_id".into(), json!(correlation_id));
        patch.insert("expires_at".into(), json!(new_expires_at.to_rfc3339()));

        let updated = self.store.update(LOCK_TABLE, &condition, patch).await?;
        Ok(!updated.is_empty())
    }

    /// Deletes the row matched by the full `(store_id, operation,
    /// correlation_id)` triple, so a caller whose lease already expired and
    /// was taken over by someone else never releases the new holder's lock.
    /// Calling this twice with the same correlation id is a no-op the
    /// second time — the row is simply already gone.
    pub async fn release(&self, store_id: &str, op: LockOperation, correlation_id: &str) -> Result<(), StoreError> {
        let filter = Self::lock_filter(store_id, op).eq("correlation_id", correlation_id);
        self.store.delete(LOCK_TABLE, &filter).await?;
        Ok(())
    }
}
