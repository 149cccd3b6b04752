//! Domain facades: `generate_article`, `mine_keywords`, `create_subscription`.
//!
//! Each composes the subsystems in the same order: lock, enforce quota,
//! enqueue or call an external client — rather than exposing
//! the subsystems piecemeal. None of these hold any business logic of their
//! own beyond sequencing; every decision (allowed/denied, retryable/fatal,
//! cached/fresh) is made inside the subsystem crate that owns it.

use ccp_clients::commerce::CommerceClient;
use ccp_clients::llm::LlmClient;
use ccp_clients::ClientError;
use ccp_core::store::DataStore;
use ccp_jobqueue::{EnqueueOptions, EnqueueOutcome, JobQueue, JobQueueError, JobType, Priority};
use ccp_quota::{QuotaDecision, QuotaManager, TransitionReason, TransitionRequest};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error("quota denied: {0}")]
    QuotaDenied(String),
    #[error("job queue error: {0}")]
    JobQueue(#[from] JobQueueError),
    #[error("external client error: {0}")]
    Client(#[from] ClientError),
    #[error("store error: {0}")]
    Store(#[from] ccp_core::store::StoreError),
    #[error("quota manager error: {0}")]
    Quota(#[from] ccp_quota::QuotaError),
}

/// Bundles the subsystems a store-facing operation needs: a quota manager
/// (lock + trial + plan), a job queue, and the two external clients. One
/// `Facade` is built per process and shared across requests.
pub struct Facade {
    pub quota: QuotaManager,
    pub jobs: JobQueue,
    pub commerce: CommerceClient,
    pub llm: LlmClient,
}

impl Facade {
    pub fn new(quota: QuotaManager, jobs: JobQueue, commerce: CommerceClient, llm: LlmClient) -> Self {
        Self { quota, jobs, commerce, llm }
    }

    /// `generate article`: enforce quota under the store's lock, then
    /// enqueue a `generate_article` job. Dedup is on by default — a repeat
    /// request for the same payload within the dedup window returns the
    /// existing job instead of doing the work twice.
    pub async fn generate_article(&self, store_id: &str, payload: Value, correlation_id: &str) -> Result<EnqueueOutcome, FacadeError> {
        self.require_quota(store_id, "generate_article", correlation_id).await?;

        let options = EnqueueOptions {
            priority: Priority::Normal,
            max_attempts: 3,
            skip_if_duplicate: true,
            dedup_window_minutes: Some(60),
            ..EnqueueOptions::new()
        };
        self.jobs.enqueue(JobType::GenerateArticle, payload, options).await.map_err(FacadeError::from)
    }

    /// `mine keywords`: same lock/quota gate, lower default priority since
    /// keyword mining isn't user-blocking the way article generation is.
    pub async fn mine_keywords(&self, store_id: &str, payload: Value, correlation_id: &str) -> Result<EnqueueOutcome, FacadeError> {
        self.require_quota(store_id, "mine_keywords", correlation_id).await?;

        let options = EnqueueOptions {
            priority: Priority::Low,
            max_attempts: 3,
            skip_if_duplicate: true,
            dedup_window_minutes: Some(1440),
            ..EnqueueOptions::new()
        };
        self.jobs.enqueue(JobType::MineKeywords, payload, options).await.map_err(FacadeError::from)
    }

    /// `create subscription`: live-verifies the webhook-reported status
    /// against the commerce platform before trusting it, then
    /// transitions the store's plan under the `plan_update` lock.
    /// Only ever transitions to `SubscriptionActivated` when the
    /// reconciled status is actually active; otherwise surfaces the
    /// reconciled status without mutating plan state, leaving that to the
    /// webhook handler that owns cancellation/expiry transitions.
    pub async fn create_subscription(
        &self,
        store_id: &str,
        shop: &str,
        subscription_id: &str,
        to_plan_id: &str,
        webhook_status: &str,
        correlation_id: &str,
    ) -> Result<ccp_clients::commerce::SubscriptionStatus, FacadeError> {
        let status = self.commerce.billing.reconcile_status(shop, subscription_id, webhook_status).await?;

        if status == ccp_clients::commerce::SubscriptionStatus::Active {
            let request = TransitionRequest {
                from_plan_id: None,
                to_plan_id: to_plan_id.to_string(),
                reason: TransitionReason::SubscriptionActivated,
                subscription_id: Some(subscription_id.to_string()),
                metadata: None,
                plan_trial_days: None,
            };
            self.quota.transition_plan(store_id, request, correlation_id).await?;
        }

        Ok(status)
    }

    async fn require_quota(&self, store_id: &str, operation: &str, correlation_id: &str) -> Result<(), FacadeError> {
        let decision: QuotaDecision = self.quota.enforce_quota_with_lock(store_id, operation, correlation_id).await;
        if decision.allowed {
            Ok(())
        } else {
            Err(FacadeError::QuotaDenied(decision.reason.unwrap_or_else(|| "denied".to_string())))
        }
    }
}

/// Constructs the store-backed subsystems a [`Facade`] needs from a single
/// [`DataStore`] and the two external API handles. No process-wide
/// singleton: a caller builds exactly one of these and holds it for the
/// process lifetime.
pub fn build(
    store: Arc<dyn DataStore>,
    result_cache: Arc<ccp_jobqueue::ResultCache>,
    commerce_api: Arc<dyn ccp_clients::commerce::CommerceApi>,
    llm_api: Arc<dyn ccp_clients::llm::LlmApi>,
    graphql_tier: ccp_ratelimiter::keyed::GraphQlTier,
) -> Facade {
    let quota = QuotaManager::new(store.clone());
    let jobs = JobQueue::new(store, result_cache);
    let commerce = CommerceClient::new(commerce_api, graphql_tier);
    let llm = LlmClient::new(llm_api);
    Facade::new(quota, jobs, commerce, llm)
}
