//! Billing reconciliation: a
//! webhook-reported status is trusted unless it claims "ACTIVE" while the
//! platform disagrees, in which case a live fetch of the specific
//! subscription is authoritative. Short TTL caches cut repeat traffic,
//! styled after `ccp-jobqueue`'s result cache rather than the generic
//! `ccp-cache` Tower layer, since reconciliation isn't behind a
//! `tower::Service` call.

use super::transport::CommerceApi;
use crate::error::{ClientError, RawApiError};
use crate::ttl_cache::TtlCache;
use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;

const SUBSCRIPTION_CACHE_TTL_MINUTES: i64 = 5;
const BILLING_PREFERENCES_CACHE_TTL_MINUTES: i64 = 60;

/// The platform's own subscription vocabulary, as reported by webhooks and
/// the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorSubscriptionStatus {
    Pending,
    Active,
    Cancelled,
    Expired,
    Frozen,
    Declined,
}

impl VendorSubscriptionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "CANCELLED" => Some(Self::Cancelled),
            "EXPIRED" => Some(Self::Expired),
            "FROZEN" => Some(Self::Frozen),
            "DECLINED" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// The control plane's internal subscription status, mapped 1:1 from the
/// vendor vocabulary except `Frozen -> Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Cancelled,
    Expired,
    Paused,
}

impl From<VendorSubscriptionStatus> for SubscriptionStatus {
    fn from(vendor: VendorSubscriptionStatus) -> Self {
        match vendor {
            VendorSubscriptionStatus::Pending => SubscriptionStatus::Pending,
            VendorSubscriptionStatus::Active => SubscriptionStatus::Active,
            VendorSubscriptionStatus::Cancelled => SubscriptionStatus::Cancelled,
            VendorSubscriptionStatus::Expired => SubscriptionStatus::Expired,
            VendorSubscriptionStatus::Frozen => SubscriptionStatus::Paused,
            VendorSubscriptionStatus::Declined => SubscriptionStatus::Cancelled,
        }
    }
}

pub struct BillingClient {
    api: Arc<dyn CommerceApi>,
    subscriptions: TtlCache<Vec<Value>>,
    billing_preferences: TtlCache<Value>,
}

impl BillingClient {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self {
            api,
            subscriptions: TtlCache::new(Duration::minutes(SUBSCRIPTION_CACHE_TTL_MINUTES)),
            billing_preferences: TtlCache::new(Duration::minutes(BILLING_PREFERENCES_CACHE_TTL_MINUTES)),
        }
    }

    async fn active_subscriptions(&self, shop: &str) -> Result<Vec<Value>, RawApiError> {
        if let Some(cached) = self.subscriptions.get(shop) {
            return Ok(cached);
        }
        let subscriptions = self.api.list_active_subscriptions(shop).await?;
        self.subscriptions.set(shop, subscriptions.clone());
        Ok(subscriptions)
    }

    pub async fn billing_preferences(&self, shop: &str) -> Result<Value, RawApiError> {
        if let Some(cached) = self.billing_preferences.get(shop) {
            return Ok(cached);
        }
        let preferences = self.api.fetch_billing_preferences(shop).await?;
        self.billing_preferences.set(shop, preferences.clone());
        Ok(preferences)
    }

    /// Reconciles a webhook-reported status against the platform's own
    /// records. If the webhook claims ACTIVE but the platform has no
    /// matching active subscription, fetches the specific subscription and
    /// trusts its status instead.
    pub async fn reconcile_status(
        &self,
        shop: &str,
        subscription_id: &str,
        webhook_status: &str,
    ) -> Result<SubscriptionStatus, ClientError> {
        let webhook_vendor_status = VendorSubscriptionStatus::parse(webhook_status)
            .ok_or_else(|| ClientError::MalformedResponse(format!("unrecognized subscription status: {webhook_status}")))?;

        if webhook_vendor_status != VendorSubscriptionStatus::Active {
            return Ok(webhook_vendor_status.into());
        }

        let active = self.active_subscriptions(shop).await.map_err(|e| ClientError::Fatal {
            classification: ccp_classifier::classify(&ccp_classifier::ErrorHints { status: e.status, code: e.code.as_deref(), message: &e.message }),
            message: e.message,
        })?;

        let platform_confirms_active = active.iter().any(|row| row.get("id").and_then(Value::as_str) == Some(subscription_id));

        if platform_confirms_active {
            return Ok(SubscriptionStatus::Active);
        }

        let fetched = self.api.fetch_subscription(shop, subscription_id).await.map_err(|e| ClientError::Fatal {
            classification: ccp_classifier::classify(&ccp_classifier::ErrorHints { status: e.status, code: e.code.as_deref(), message: &e.message }),
            message: e.message,
        })?;

        let fetched_status_raw = fetched
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::MalformedResponse("fetched subscription has no status field".into()))?;

        let fetched_status = VendorSubscriptionStatus::parse(fetched_status_raw)
            .ok_or_else(|| ClientError::MalformedResponse(format!("unrecognized subscription status: {fetched_status_raw}")))?;

        Ok(fetched_status.into())
    }
}
