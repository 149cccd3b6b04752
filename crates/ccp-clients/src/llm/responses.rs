//! Text-generation calls: per-model token-bucket limiter, retry with
//! classification-aware backoff, and per-call in-flight deduplication so
//! two concurrent callers asking for the same prompt on the same model
//! share one upstream call.

use super::transport::{LlmApi, ResponseRequest, ResponseResult};
use crate::error::ClientError;
use crate::retry_support::default_retry_builder;
use ccp_coalesce::{CoalesceConfig, CoalesceError, CoalesceService};
use ccp_core::cancellation::CancellationToken;
use ccp_ratelimiter::keyed::{Algorithm, KeyedRateLimiter};
use ccp_retry::call::retry_call;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt};

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const MAX_WAIT_FOR_TOKEN: Duration = Duration::from_secs(30);
const DEFAULT_REQUESTS_PER_MINUTE: f64 = 60.0;

// `CoalesceService` requires its inner service to be `Clone` (each waiter
// calls through the same instance); a plain `BoxService` erases that bound
// away, so the clonable variant is needed here.
type Inner = BoxCloneService<ResponseRequest, ResponseResult, ClientError>;
type KeyFn = fn(&ResponseRequest) -> String;

fn coalesce_key(request: &ResponseRequest) -> String {
    format!("{}:{}", request.model, request.prompt)
}

fn unwrap_coalesce_error(error: CoalesceError<ClientError>) -> ClientError {
    match error {
        CoalesceError::Service(inner) => inner,
        CoalesceError::LeaderCancelled => {
            ClientError::MalformedResponse("leader request was cancelled before completion".into())
        }
        CoalesceError::RecvError => ClientError::MalformedResponse("failed to receive coalesced result".into()),
    }
}

/// One token-bucket limiter per model name; every model shares the same
/// bucket shape, since the provider's per-model quotas aren't part of
/// this interface's contract.
pub struct ResponsesClient {
    limiter: Arc<KeyedRateLimiter>,
    coalesce: AsyncMutex<CoalesceService<Inner, String, ResponseRequest, KeyFn>>,
}

impl ResponsesClient {
    pub fn new(api: Arc<dyn LlmApi>) -> Self {
        let limiter = Arc::new(KeyedRateLimiter::new(Algorithm::TokenBucket {
            max_requests: DEFAULT_REQUESTS_PER_MINUTE,
            window: Duration::from_secs(60),
            burst: DEFAULT_REQUESTS_PER_MINUTE,
        }));

        let call_service = tower::service_fn(move |request: ResponseRequest| {
            let api = api.clone();
            async move {
                let config = default_retry_builder::<ResponseRequest>(DEFAULT_MAX_ATTEMPTS).build_config();
                let token = CancellationToken::new();
                retry_call(&config, &token, request, move |req| {
                    let api = api.clone();
                    async move { api.generate_response(req).await }
                })
                .await
                .map_err(ClientError::from)
            }
        });

        let config = Arc::new(CoalesceConfig::new(coalesce_key as KeyFn));
        let coalesce = CoalesceService::new(BoxCloneService::new(call_service), config);

        Self { limiter, coalesce: AsyncMutex::new(coalesce) }
    }

    pub async fn call(&self, request: ResponseRequest) -> Result<ResponseResult, ClientError> {
        if !self.limiter.wait_for_token(&request.model, MAX_WAIT_FOR_TOKEN, 1.0).await {
            return Err(ClientError::RateLimited { wait: MAX_WAIT_FOR_TOKEN });
        }

        // The mutex only guards registering as leader/waiter; the returned
        // future is self-contained, so it's awaited after the lock is
        // dropped — otherwise two concurrent calls would serialize on the
        // lock instead of actually coalescing.
        let future = {
            let mut service = self.coalesce.lock().await;
            service.ready().await.map_err(unwrap_coalesce_error)?;
            service.call(request)
        };

        future.await.map_err(unwrap_coalesce_error)
    }
}
