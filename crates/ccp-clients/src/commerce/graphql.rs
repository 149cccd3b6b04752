//! GraphQL adapter: cost-estimates a query, pre-checks and later refunds
//! the GraphQL limiter with the vendor-reported actual cost, and classifies
//! partial-failure responses into `USER_ERROR` vs `GRAPHQL_ERROR`.

use super::transport::{CommerceApi, GraphQlRequest, GraphQlResponse};
use crate::error::{ClientError, RawApiError};
use crate::retry_support::default_retry_builder;
use ccp_core::cancellation::CancellationToken;
use ccp_ratelimiter::keyed::{CommerceRateLimiter, GraphQlCheck};
use ccp_retry::call::retry_call;
use std::sync::Arc;

const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Classifies one GraphQL error entry: the presence of a `path`
/// or an explicit `code: USER_ERROR` marks it as user-caused rather than a
/// transport/server-side failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphQlErrorKind {
    UserError,
    GraphQlError,
}

pub fn classify_graphql_error(entry: &super::transport::GraphQlErrorEntry) -> GraphQlErrorKind {
    if entry.path.is_some() || entry.code.as_deref() == Some("USER_ERROR") {
        GraphQlErrorKind::UserError
    } else {
        GraphQlErrorKind::GraphQlError
    }
}

/// Estimates a GraphQL query's cost as `1 + 0.1 * field_count +
/// connection_count + 0.01 * sum(first_args)`, used for the pre-check
/// against the GraphQL limiter before the vendor reports the actual cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryShape {
    pub field_count: u32,
    pub connection_count: u32,
    pub first_args_sum: u64,
}

impl QueryShape {
    pub fn estimated_cost(&self) -> f64 {
        1.0 + 0.1 * self.field_count as f64 + self.connection_count as f64 + 0.01 * self.first_args_sum as f64
    }
}

pub struct CommerceGraphQlClient {
    api: Arc<dyn CommerceApi>,
    limiter: Arc<CommerceRateLimiter>,
}

impl CommerceGraphQlClient {
    pub fn new(api: Arc<dyn CommerceApi>, limiter: Arc<CommerceRateLimiter>) -> Self {
        Self { api, limiter }
    }

    pub async fn call(&self, shop: &str, request: GraphQlRequest, shape: QueryShape) -> Result<GraphQlResponse, ClientError> {
        let requested = shape.estimated_cost();

        match self.limiter.graphql_check(shop, requested) {
            GraphQlCheck::TooExpensive => return Err(ClientError::QueryTooExpensive { cost: requested }),
            GraphQlCheck::Admitted => {}
            GraphQlCheck::Rejected { wait } => return Err(ClientError::RateLimited { wait }),
        }

        let config = default_retry_builder::<GraphQlRequest>(DEFAULT_MAX_ATTEMPTS).build_config();
        let token = CancellationToken::new();
        let api = self.api.clone();
        let shop_owned = shop.to_string();

        let response = retry_call(&config, &token, request, move |req| {
            let api = api.clone();
            let shop = shop_owned.clone();
            async move { api.graphql(&shop, req).await }
        })
        .await?;

        let actual = response.actual_cost.unwrap_or(requested);
        self.limiter.graphql_report_actual_cost(shop, requested, actual);

        Ok(response)
    }
}

/// Separates a response's errors into the two categories above,
/// returning `(user_errors, graphql_errors)`.
pub fn partition_errors(response: &GraphQlResponse) -> (Vec<&str>, Vec<&str>) {
    let mut user = Vec::new();
    let mut upstream = Vec::new();
    for entry in &response.errors {
        match classify_graphql_error(entry) {
            GraphQlErrorKind::UserError => user.push(entry.message.as_str()),
            GraphQlErrorKind::GraphQlError => upstream.push(entry.message.as_str()),
        }
    }
    (user, upstream)
}
