//! The error kinds external clients surface to callers: external failures
//! are retried by the engine and wrapped; everything else is a domain
//! result or a fatal passthrough.

use ccp_classifier::Classification;
use ccp_retry::RetryError;
use std::time::Duration;

/// A request-execution failure reported by the HTTP collaborator a client
/// wraps. Clients never construct this directly from a concrete HTTP
/// stack — it is the shape [`crate::commerce::CommerceApi`] and
/// [`crate::llm::LlmApi`] implementations report.
#[derive(Debug, Clone)]
pub struct RawApiError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RawApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RawApiError {}

/// Errors surfaced by the commerce and LLM clients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The call exhausted its retry budget/attempts; carries the
    /// classification of the last observed error.
    #[error("request failed after retries: {0}")]
    Retries(#[from] RetryError<RawApiError>),

    /// The rate limiter refused to admit the call within its wait budget.
    #[error("rate limited, wait up to {wait:?}")]
    RateLimited { wait: Duration },

    /// A GraphQL query was refused before any budget was spent because its
    /// estimated cost exceeded the hard maximum.
    #[error("query cost {cost} exceeds the maximum allowed")]
    QueryTooExpensive { cost: f64 },

    /// The upstream response could not be parsed even under the permissive
    /// schema clients apply to dynamic JSON payloads.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A fatal, non-retryable failure (authentication/authorization/validation).
    #[error("{classification:?}: {message}")]
    Fatal { classification: Classification, message: String },
}

impl ClientError {
    pub fn retryable(&self) -> bool {
        match self {
            ClientError::Retries(_) | ClientError::RateLimited { .. } => true,
            ClientError::QueryTooExpensive { .. } | ClientError::MalformedResponse(_) | ClientError::Fatal { .. } => false,
        }
    }
}
