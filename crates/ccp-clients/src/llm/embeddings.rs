//! Embedding calls: per-model token-bucket limiter, retry, and a 30-minute
//! TTL cache keyed by model + input text. Per-process only; resets
//! on destroy, same as every other cache in this crate.

use super::transport::{EmbeddingRequest, EmbeddingResult, LlmApi};
use crate::error::ClientError;
use crate::retry_support::default_retry_builder;
use crate::ttl_cache::TtlCache;
use ccp_core::cancellation::CancellationToken;
use ccp_ratelimiter::keyed::{Algorithm, KeyedRateLimiter};
use ccp_retry::call::retry_call;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const MAX_WAIT_FOR_TOKEN: Duration = Duration::from_secs(30);
const DEFAULT_REQUESTS_PER_MINUTE: f64 = 60.0;
const EMBEDDING_CACHE_TTL_MINUTES: i64 = 30;

fn cache_key(request: &EmbeddingRequest) -> String {
    format!("{}:{}", request.model, request.input)
}

pub struct EmbeddingsClient {
    api: Arc<dyn LlmApi>,
    limiter: Arc<KeyedRateLimiter>,
    cache: TtlCache<EmbeddingResult>,
}

impl EmbeddingsClient {
    pub fn new(api: Arc<dyn LlmApi>) -> Self {
        Self {
            api,
            limiter: Arc::new(KeyedRateLimiter::new(Algorithm::TokenBucket {
                max_requests: DEFAULT_REQUESTS_PER_MINUTE,
                window: Duration::from_secs(60),
                burst: DEFAULT_REQUESTS_PER_MINUTE,
            })),
            cache: TtlCache::new(ChronoDuration::minutes(EMBEDDING_CACHE_TTL_MINUTES)),
        }
    }

    pub async fn call(&self, request: EmbeddingRequest) -> Result<EmbeddingResult, ClientError> {
        let key = cache_key(&request);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        if !self.limiter.wait_for_token(&request.model, MAX_WAIT_FOR_TOKEN, 1.0).await {
            return Err(ClientError::RateLimited { wait: MAX_WAIT_FOR_TOKEN });
        }

        let config = default_retry_builder::<EmbeddingRequest>(DEFAULT_MAX_ATTEMPTS).build_config();
        let token = CancellationToken::new();
        let api = self.api.clone();

        let result = retry_call(&config, &token, request, move |req| {
            let api = api.clone();
            async move { api.create_embedding(req).await }
        })
        .await?;

        self.cache.set(key, result.clone());
        Ok(result)
    }
}
