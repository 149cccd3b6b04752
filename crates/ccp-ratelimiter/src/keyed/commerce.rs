//! The commerce-platform rate limiter profile: two limiters per shop — REST
//! (token bucket) and GraphQL (leaky bucket, parameterized by plan tier),
//! with query-cost refund and a hard per-query cost ceiling.

use super::{Algorithm, KeyedRateLimiter, LimitDecision};
use std::time::Duration;

/// Selects the GraphQL leaky-bucket parameters for a shop's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphQlTier {
    Standard,
    Advanced,
    Plus,
    Enterprise,
}

impl GraphQlTier {
    fn burst(self) -> f64 {
        match self {
            GraphQlTier::Standard => 1000.0,
            GraphQlTier::Advanced => 2000.0,
            GraphQlTier::Plus => 10_000.0,
            GraphQlTier::Enterprise => 20_000.0,
        }
    }

    fn restore_rate(self) -> f64 {
        match self {
            GraphQlTier::Standard => 100.0,
            GraphQlTier::Advanced => 200.0,
            GraphQlTier::Plus => 1000.0,
            GraphQlTier::Enterprise => 2000.0,
        }
    }
}

const REST_REQUESTS_PER_MINUTE: f64 = 40.0;
const MAX_QUERY_COST: f64 = 1000.0;

/// Per-shop REST + GraphQL rate limiting. One `CommerceRateLimiter` is
/// shared across every shop; the shop domain is the key into each
/// underlying [`KeyedRateLimiter`].
pub struct CommerceRateLimiter {
    rest: KeyedRateLimiter,
    graphql: KeyedRateLimiter,
}

impl CommerceRateLimiter {
    pub fn new(tier: GraphQlTier) -> Self {
        Self {
            rest: KeyedRateLimiter::new(Algorithm::TokenBucket {
                max_requests: REST_REQUESTS_PER_MINUTE,
                window: Duration::from_secs(60),
                burst: REST_REQUESTS_PER_MINUTE,
            }),
            graphql: KeyedRateLimiter::new(Algorithm::LeakyBucket {
                restore_rate: tier.restore_rate(),
                burst: tier.burst(),
            }),
        }
    }

    pub fn rest_check(&self, shop: &str) -> LimitDecision {
        self.rest.check_limit(shop, 1.0)
    }

    pub async fn rest_wait(&self, shop: &str, max_wait: Duration) -> bool {
        self.rest.wait_for_token(shop, max_wait, 1.0).await
    }

    /// Pre-checks a GraphQL call for `requested` cost. Queries above the
    /// hard maximum are refused without consuming any budget.
    pub fn graphql_check(&self, shop: &str, requested: f64) -> GraphQlCheck {
        if requested > MAX_QUERY_COST {
            return GraphQlCheck::TooExpensive;
        }
        match self.graphql.check_limit(shop, requested) {
            LimitDecision::Admitted => GraphQlCheck::Admitted,
            LimitDecision::Rejected { wait } => GraphQlCheck::Rejected { wait },
            LimitDecision::ConcurrencyExceeded => GraphQlCheck::Rejected { wait: Duration::ZERO },
        }
    }

    /// After the response returns, reports the vendor-reported actual cost;
    /// the difference between `requested` and `actual` is refunded to the
    /// shop's GraphQL bucket (never exceeding burst).
    pub fn graphql_report_actual_cost(&self, shop: &str, requested: f64, actual: f64) {
        let refund = (requested - actual).max(0.0);
        if refund > 0.0 {
            self.graphql.refund(shop, refund);
        }
    }

    pub fn graphql_tokens_remaining(&self, shop: &str) -> Option<f64> {
        self.graphql.tokens_remaining(shop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphQlCheck {
    Admitted,
    Rejected { wait: Duration },
    TooExpensive,
}
