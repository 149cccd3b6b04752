//! The commerce platform's HTTP surface is out of scope: this trait is
//! the narrow request-execution interface the REST and GraphQL adapters
//! depend on instead of any concrete HTTP client, mirroring how
//! [`ccp_core::store::DataStore`] stands in for the relational store.

use crate::error::RawApiError;
use async_trait::async_trait;
use serde_json::Value;

/// One REST call: method + path + optional JSON body, returning the
/// decoded JSON body on success.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// One GraphQL call: query document + variables.
#[derive(Debug, Clone)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Value,
}

/// The GraphQL response envelope: `data`, any errors, and the
/// vendor-reported actual query cost used to refund the limiter.
#[derive(Debug, Clone, Default)]
pub struct GraphQlResponse {
    pub data: Option<Value>,
    pub errors: Vec<GraphQlErrorEntry>,
    pub actual_cost: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GraphQlErrorEntry {
    pub message: String,
    pub path: Option<Value>,
    pub code: Option<String>,
}

#[async_trait]
pub trait CommerceApi: Send + Sync {
    async fn rest(&self, shop: &str, request: RestRequest) -> Result<Value, RawApiError>;
    async fn graphql(&self, shop: &str, request: GraphQlRequest) -> Result<GraphQlResponse, RawApiError>;

    /// Subscriptions the platform currently considers active for `shop`,
    /// used by billing reconciliation's live-verification step.
    async fn list_active_subscriptions(&self, shop: &str) -> Result<Vec<Value>, RawApiError>;

    /// Fetches one subscription by id, used when a webhook-reported
    /// "ACTIVE" status disagrees with [`Self::list_active_subscriptions`].
    async fn fetch_subscription(&self, shop: &str, subscription_id: &str) -> Result<Value, RawApiError>;

    async fn fetch_billing_preferences(&self, shop: &str) -> Result<Value, RawApiError>;
}
