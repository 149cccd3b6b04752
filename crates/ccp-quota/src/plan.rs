//! Plan transitions: upgrades, downgrades, trial start/expiry, cancellation.

use crate::audit::record_audit;
use crate::error::QuotaError;
use crate::lock::LockOperation;
use crate::quota::{QuotaManager, STORES_TABLE};
use crate::types::{TransitionRequest, TransitionReason};
use ccp_core::store::{Filter, LogLevel, LogLine, Row};
use chrono::{Duration, Utc};
use serde_json::json;

impl QuotaManager {
    pub async fn transition_plan(
        &self,
        store_id: &str,
        request: TransitionRequest,
        correlation_id: &str,
    ) -> Result<(), QuotaError> {
        if !self.locks.acquire(store_id, LockOperation::PlanUpdate, correlation_id).await? {
            return Err(QuotaError::LockHeld { store_id: store_id.to_string(), operation: "plan_update" });
        }

        let result = self.transition_plan_inner(store_id, &request, correlation_id).await;

        let _ = self.locks.release(store_id, LockOperation::PlanUpdate, correlation_id).await;

        result.map_err(QuotaError::from)
    }

    async fn transition_plan_inner(
        &self,
        store_id: &str,
        request: &TransitionRequest,
        correlation_id: &str,
    ) -> Result<(), ccp_core::store::StoreError> {
        let now = Utc::now();
        let mut patch = Row::new();

        match request.reason {
            TransitionReason::SubscriptionActivated | TransitionReason::Upgrade => {
                patch.insert("trial_started_at".into(), serde_json::Value::Null);
                patch.insert("trial_ends_at".into(), serde_json::Value::Null);
            }
            TransitionReason::TrialStart => {
                let trial_days = request.plan_trial_days.unwrap_or(crate::trial::DEFAULT_TRIAL_DAYS);
                patch.insert("trial_started_at".into(), json!(now.to_rfc3339()));
                patch.insert("trial_ends_at".into(), json!((now + Duration::days(trial_days)).to_rfc3339()));
            }
            TransitionReason::TrialExpired | TransitionReason::SubscriptionCancelled => {
                if request.subscription_id.is_none() {
                    patch.insert("is_paused".into(), json!(true));
                }
            }
            TransitionReason::Downgrade => {}
        }

        patch.insert("plan_id".into(), json!(request.to_plan_id));
        patch.insert("updated_at".into(), json!(now.to_rfc3339()));
        if let Some(ref subscription_id) = request.subscription_id {
            patch.insert("subscription_id".into(), json!(subscription_id));
        }

        self.store.update(STORES_TABLE, &Filter::new().eq("store_id", store_id), patch).await?;

        if let Err(err) = self.store.sync_plan_limits_to_store(store_id, &request.to_plan_id).await {
            LogLine::new(LogLevel::Warn, "ccp-quota", "sync_plan_limits_to_store failed; limits self-heal on next quota check")
                .with_context("store_id", store_id)
                .with_context("error", err.to_string())
                .emit();
        }

        record_audit(
            self.store.as_ref(),
            store_id,
            "plan_transitioned",
            json!({
                "correlation_id": correlation_id,
                "from_plan_id": request.from_plan_id,
                "to_plan_id": request.to_plan_id,
                "reason": request.reason,
                "metadata": request.metadata,
            }),
        )
        .await;

        Ok(())
    }
}
