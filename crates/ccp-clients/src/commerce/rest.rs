//! REST adapter for the commerce platform: rate limiter pre-check, retry
//! with classification-aware backoff, no caching (REST calls are assumed
//! non-idempotent-safe unless the caller dedups at a higher layer).

use super::transport::{CommerceApi, RestRequest};
use crate::error::{ClientError, RawApiError};
use crate::retry_support::default_retry_builder;
use ccp_core::cancellation::CancellationToken;
use ccp_ratelimiter::keyed::CommerceRateLimiter;
use ccp_retry::call::retry_call;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const MAX_WAIT_FOR_TOKEN: Duration = Duration::from_secs(30);

pub struct CommerceRestClient {
    api: Arc<dyn CommerceApi>,
    limiter: Arc<CommerceRateLimiter>,
}

impl CommerceRestClient {
    pub fn new(api: Arc<dyn CommerceApi>, limiter: Arc<CommerceRateLimiter>) -> Self {
        Self { api, limiter }
    }

    /// Waits for a REST token (40/min default, per-shop) then executes
    /// `request` under retry. Times out the wait after 30s, surfaced as a
    /// rate-limit rejection rather than a retry exhaustion.
    pub async fn call(&self, shop: &str, request: RestRequest) -> Result<Value, ClientError> {
        if !self.limiter.rest_wait(shop, MAX_WAIT_FOR_TOKEN).await {
            return Err(ClientError::RateLimited { wait: MAX_WAIT_FOR_TOKEN });
        }

        let config = default_retry_builder::<RestRequest>(DEFAULT_MAX_ATTEMPTS).build_config();
        let token = CancellationToken::new();
        let api = self.api.clone();
        let shop = shop.to_string();

        retry_call(&config, &token, request, move |req| {
            let api = api.clone();
            let shop = shop.clone();
            async move { api.rest(&shop, req).await }
        })
        .await
        .map_err(ClientError::from)
    }
}
