//! Wires the classifier into a [`RetryConfig`] the way every external
//! client needs: retryability from the classifier, and the rate-limit/
//! slow-timeout delay multipliers it also determines.

use crate::error::RawApiError;
use ccp_classifier::{classify, Category, ErrorHints};
use ccp_retry::RetryConfigBuilder;
use std::time::Duration;

fn hints(error: &RawApiError) -> ErrorHints<'_> {
    ErrorHints {
        status: error.status,
        code: error.code.as_deref(),
        message: &error.message,
    }
}

/// A `RawApiError` classified as slow if a caller recorded a response time;
/// external clients don't have a response-time-bearing error shape, so the
/// ×1.5 "slow timeout" multiplier is approximated as "timeout category,
/// always eligible" — callers needing an exact response-time threshold
/// attach it via [`ccp_retry::RetryConfigBuilder::delay_multiplier`] on top
/// of this base.
pub fn default_retry_builder<Req: Clone>(max_attempts: usize) -> RetryConfigBuilder<Req, RawApiError> {
    RetryConfigBuilder::new()
        .max_attempts(max_attempts)
        .exponential_backoff(Duration::from_millis(200))
        .max_delay(Duration::from_secs(30))
        .retry_on(|error: &RawApiError| classify(&hints(error)).retryable)
        .delay_multiplier(|error: &RawApiError| {
            let classification = classify(&hints(error));
            match classification.category {
                Category::RateLimit => 2.0,
                Category::Timeout => 1.5,
                _ => 1.0,
            }
        })
}
