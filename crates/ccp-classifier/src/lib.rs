//! Error classification for the content-automation control plane.
//!
//! [`classify`] is a pure function over a raw error's status code and error
//! code/message hints: it never inspects wall-clock time or I/O, so a given
//! `(status, code, message)` triple always classifies the same way. The
//! [`ClassificationCache`] wraps it with a bounded TTL cache keyed by
//! `(status, code, message[:100])` so call sites that reclassify the same
//! handful of upstream error shapes over and over don't re-walk the rule
//! chain every time.

mod cache;

pub use cache::ClassificationCache;

use ccp_core::CorrelationId;
use std::time::Instant;

/// The category a raw error falls into. Order here matches the rule
/// precedence in [`classify`], not alphabetical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Network,
    Timeout,
    RateLimit,
    Authentication,
    Authorization,
    Validation,
    ServerError,
    ClientError,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// The result of classifying one error occurrence.
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: Category,
    pub severity: Severity,
    pub retryable: bool,
    pub correlation_id: CorrelationId,
    pub timestamp: Instant,
    /// A short, human-oriented description of the matched rule, attached so
    /// logs can show why an error was classified the way it was without the
    /// caller re-deriving it.
    pub stack: String,
}

/// The hints a caller extracts from its own error/response type before
/// calling [`classify`]. `message` is expected to already be whatever text
/// representation the caller has (e.g. `err.to_string()`); classification
/// only ever inspects its first 100 bytes.
#[derive(Debug, Clone, Default)]
pub struct ErrorHints<'a> {
    pub status: Option<u16>,
    pub code: Option<&'a str>,
    pub message: &'a str,
}

/// Classifies a raw error using an ordered rule chain:
///
/// 1. codes `ECONNRESET|ETIMEDOUT|ENOTFOUND` → network, medium, retryable.
/// 2. message contains "timeout" → timeout, medium, retryable.
/// 3. status 429 or message contains "rate limit" → rate_limit, low, retryable.
/// 4. status 401 → authentication, high, not retryable.
/// 5. status 403 → authorization, high, not retryable.
/// 6. status 400/422 → validation, medium, not retryable.
/// 7. status >= 500 → server_error, high, retryable.
/// 8. 400 <= status < 500 → client_error, medium, not retryable.
/// 9. otherwise → unknown, medium, not retryable.
pub fn classify(hints: &ErrorHints<'_>) -> Classification {
    let message_lower = hints.message.to_lowercase();
    let (category, severity, retryable, rule) = classify_rule(hints, &message_lower);

    Classification {
        category,
        severity,
        retryable,
        correlation_id: CorrelationId::new(),
        timestamp: Instant::now(),
        stack: rule.to_string(),
    }
}

fn classify_rule(hints: &ErrorHints<'_>, message_lower: &str) -> (Category, Severity, bool, &'static str) {
    const NETWORK_CODES: [&str; 3] = ["ECONNRESET", "ETIMEDOUT", "ENOTFOUND"];

    if let Some(code) = hints.code {
        if NETWORK_CODES.contains(&code) {
            return (Category::Network, Severity::Medium, true, "network-code");
        }
    }

    if message_lower.contains("timeout") {
        return (Category::Timeout, Severity::Medium, true, "message-timeout");
    }

    if hints.status == Some(429) || message_lower.contains("rate limit") {
        return (Category::RateLimit, Severity::Low, true, "rate-limit");
    }

    match hints.status {
        Some(401) => return (Category::Authentication, Severity::High, false, "status-401"),
        Some(403) => return (Category::Authorization, Severity::High, false, "status-403"),
        Some(400) | Some(422) => return (Category::Validation, Severity::Medium, false, "status-4xx-validation"),
        _ => {}
    }

    if let Some(status) = hints.status {
        if status >= 500 {
            return (Category::ServerError, Severity::High, true, "status-5xx");
        }
        if (400..500).contains(&status) {
            return (Category::ClientError, Severity::Medium, false, "status-4xx");
        }
    }

    (Category::Unknown, Severity::Medium, false, "unmatched")
}
