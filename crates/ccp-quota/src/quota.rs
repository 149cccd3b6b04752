//! `enforceQuotaWithLock` and trial-expiration handling.

use crate::audit::record_audit;
use crate::lock::{LockManager, LockOperation};
use crate::types::{QuotaDecision, StoreSnapshot};
use ccp_core::store::{DataStore, Filter, Row};
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;

pub const STORES_TABLE: &str = "stores";
pub const TRIAL_GRACE_DAYS: i64 = 3;
pub const GRACE_CREATION_WINDOW_HOURS: i64 = 1;

pub struct QuotaManager {
    pub(crate) store: Arc<dyn DataStore>,
    pub(crate) locks: LockManager,
}

impl QuotaManager {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        let locks = LockManager::new(store.clone());
        Self { store, locks }
    }

    /// Acquires the quota-check lock, evaluates the store's current status,
    /// and always releases the lock on the way out, success or failure, via
    /// a guard-style `finally`.
    pub async fn enforce_quota_with_lock(&self, store_id: &str, operation: &str, correlation_id: &str) -> QuotaDecision {
        if !self.locks.acquire(store_id, LockOperation::QuotaCheck, correlation_id).await.unwrap_or(false) {
            return QuotaDecision::denied("processing", false);
        }

        let decision = self.enforce_quota_inner(store_id, operation, correlation_id).await;

        let _ = self.locks.release(store_id, LockOperation::QuotaCheck, correlation_id).await;

        decision
    }

    async fn enforce_quota_inner(&self, store_id: &str, _operation: &str, correlation_id: &str) -> QuotaDecision {
        let Ok(Some(row)) = self.store.get_store_quota_status(store_id).await else {
            return QuotaDecision::denied("not configured", true);
        };

        let mut snapshot = StoreSnapshot::from_row(&row);

        if !snapshot.is_active {
            return QuotaDecision::denied("inactive", true);
        }
        if snapshot.is_paused {
            return QuotaDecision::denied("paused", true);
        }

        if snapshot.trial_expired(Utc::now()) {
            if let Some(denied) = self.handle_trial_expiration(&mut snapshot, correlation_id).await {
                return denied;
            }
        }

        match snapshot.articles_remaining {
            Some(remaining) if remaining > 0 => QuotaDecision::allowed(remaining),
            _ => QuotaDecision::denied("quota exceeded", true),
        }
    }

    /// Returns `Some(decision)` when the caller must deny immediately
    /// (store just paused); `None` means the trial is in an active grace
    /// period and the caller should continue evaluating quota.
    async fn handle_trial_expiration(&self, snapshot: &mut StoreSnapshot, correlation_id: &str) -> Option<QuotaDecision> {
        let now = Utc::now();
        let Some(trial_ends_at) = snapshot.trial_ends_at else {
            return None;
        };

        if snapshot.grace_period_ends_at.is_none() {
            let since_expiry = now - trial_ends_at;
            if since_expiry > Duration::zero() && since_expiry < Duration::hours(GRACE_CREATION_WINDOW_HOURS) {
                let grace_ends_at = now + Duration::days(TRIAL_GRACE_DAYS);
                let mut patch = Row::new();
                patch.insert("grace_period_ends_at".into(), json!(grace_ends_at.to_rfc3339()));
                let _ = self
                    .store
                    .update(STORES_TABLE, &Filter::new().eq("store_id", snapshot.store_id.clone()), patch)
                    .await;
                snapshot.grace_period_ends_at = Some(grace_ends_at);
                record_audit(self.store.as_ref(), &snapshot.store_id, "grace_period_started", json!({"correlation_id": correlation_id})).await;
            }
        }

        if let Some(grace_ends_at) = snapshot.grace_period_ends_at {
            if now > grace_ends_at {
                let mut patch = Row::new();
                patch.insert("is_paused".into(), json!(true));
                let _ = self
                    .store
                    .update(STORES_TABLE, &Filter::new().eq("store_id", snapshot.store_id.clone()), patch)
                    .await;
                snapshot.is_paused = true;
                record_audit(self.store.as_ref(), &snapshot.store_id, "store_paused_trial_expired", json!({"correlation_id": correlation_id})).await;
                return Some(QuotaDecision::denied("trial expired", true));
            }
        }

        None
    }
}
