//! Trial initialization and idempotent re-entry.

use crate::audit::record_audit;
use crate::error::QuotaError;
use crate::lock::LockOperation;
use crate::quota::{QuotaManager, STORES_TABLE};
use crate::types::StoreSnapshot;
use ccp_core::store::{Filter, Row};
use chrono::{Duration, Utc};
use serde_json::json;

pub const DEFAULT_TRIAL_DAYS: i64 = 14;

impl QuotaManager {
    /// Idempotent on an active, non-expired trial: returns the current
    /// derived status without writing anything unless `force_reset` or the
    /// trial has expired.
    pub async fn initialize_trial(
        &self,
        store_id: &str,
        trial_days: Option<i64>,
        correlation_id: &str,
        force_reset: bool,
    ) -> Result<StoreSnapshot, QuotaError> {
        if !self.locks.acquire(store_id, LockOperation::TrialUpdate, correlation_id).await? {
            return Err(QuotaError::LockHeld { store_id: store_id.to_string(), operation: "trial_update" });
        }

        let result = self.initialize_trial_inner(store_id, trial_days, correlation_id, force_reset).await;

        let _ = self.locks.release(store_id, LockOperation::TrialUpdate, correlation_id).await;

        result.map_err(QuotaError::from)
    }

    async fn initialize_trial_inner(
        &self,
        store_id: &str,
        trial_days: Option<i64>,
        correlation_id: &str,
        force_reset: bool,
    ) -> Result<StoreSnapshot, ccp_core::store::StoreError> {
        let row = self.store.get_store_quota_status(store_id).await?.unwrap_or_default();
        let snapshot = StoreSnapshot::from_row(&row);

        let subscription_active = snapshot.subscription_id.is_some() && !snapshot.is_paused;
        if subscription_active {
            return Ok(snapshot);
        }

        let trial_exists = snapshot.trial_started_at.is_some();
        let trial_expired = snapshot.trial_expired(Utc::now());
        if trial_exists && !trial_expired && !force_reset {
            return Ok(snapshot);
        }

        let now = Utc::now();
        let started_at = if trial_exists && !force_reset {
            snapshot.trial_started_at.unwrap_or(now)
        } else {
            now
        };
        let days = trial_days.unwrap_or(DEFAULT_TRIAL_DAYS);
        let ends_at = started_at + Duration::days(days);

        let mut patch = Row::new();
        patch.insert("trial_started_at".into(), json!(started_at.to_rfc3339()));
        patch.insert("trial_ends_at".into(), json!(ends_at.to_rfc3339()));
        patch.insert("plan_id".into(), json!("free_trial_plan"));
        patch.insert("is_active".into(), json!(true));
        patch.insert("is_paused".into(), json!(false));
        patch.insert("grace_period_ends_at".into(), serde_json::Value::Null);

        self.store.update(STORES_TABLE, &Filter::new().eq("store_id", store_id), patch).await?;

        record_audit(self.store.as_ref(), store_id, "trial_initialized", json!({"correlation_id": correlation_id})).await;

        Ok(StoreSnapshot {
            store_id: store_id.to_string(),
            is_active: true,
            is_paused: false,
            plan_id: Some("free_trial_plan".to_string()),
            subscription_id: snapshot.subscription_id,
            trial_started_at: Some(started_at),
            trial_ends_at: Some(ends_at),
            grace_period_ends_at: None,
            articles_remaining: snapshot.articles_remaining,
        })
    }
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            store_id: String::new(),
            is_active: true,
            is_paused: false,
            plan_id: None,
            subscription_id: None,
            trial_started_at: None,
            trial_ends_at: None,
            grace_period_ends_at: None,
            articles_remaining: None,
        }
    }
}
