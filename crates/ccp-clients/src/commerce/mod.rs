//! The commerce-platform adapter: REST and GraphQL call paths, plus
//! billing/subscription reconciliation.

mod billing;
mod graphql;
mod rest;
mod transport;

pub use billing::{BillingClient, SubscriptionStatus, VendorSubscriptionStatus};
pub use graphql::{classify_graphql_error, partition_errors, CommerceGraphQlClient, GraphQlErrorKind, QueryShape};
pub use rest::CommerceRestClient;
pub use transport::{CommerceApi, GraphQlErrorEntry, GraphQlRequest, GraphQlResponse, RestRequest};

use ccp_ratelimiter::keyed::{CommerceRateLimiter, GraphQlTier};
use std::sync::Arc;

/// Bundles the REST, GraphQL and billing clients behind the shared rate
/// limiter and transport they all depend on, the way a caller actually
/// wants to hold a commerce-platform client: one object, one limiter.
pub struct CommerceClient {
    pub rest: CommerceRestClient,
    pub graphql: CommerceGraphQlClient,
    pub billing: BillingClient,
}

impl CommerceClient {
    pub fn new(api: Arc<dyn CommerceApi>, graphql_tier: GraphQlTier) -> Self {
        let limiter = Arc::new(CommerceRateLimiter::new(graphql_tier));
        Self {
            rest: CommerceRestClient::new(api.clone(), limiter.clone()),
            graphql: CommerceGraphQlClient::new(api.clone(), limiter),
            billing: BillingClient::new(api),
        }
    }
}
