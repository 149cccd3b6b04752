//! Demonstrates `generate_article` denying once quota is exhausted, then
//! succeeding again once a plan transition restores it — the lock/quota
//! gate and the job queue composed exactly as `Facade` wires them.

use async_trait::async_trait;
use ccp::facade::{build, FacadeError};
use ccp_clients::commerce::{CommerceApi, GraphQlRequest, GraphQlResponse, RestRequest};
use ccp_clients::llm::{EmbeddingRequest, EmbeddingResult, LlmApi, ResponseRequest, ResponseResult};
use ccp_clients::RawApiError;
use ccp_core::store::{DataStore, Filter, Page, Row, StoreError};
use ccp_jobqueue::ResultCache;
use ccp_ratelimiter::keyed::GraphQlTier;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct InMemoryStore {
    quota: Mutex<Option<Row>>,
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn insert(&self, _table: &str, data: Row) -> Result<Row, StoreError> {
        Ok(data)
    }
    async fn update(&self, _table: &str, _filter: &Filter, data: Row) -> Result<Vec<Row>, StoreError> {
        Ok(vec![data])
    }
    async fn upsert(&self, _table: &str, _columns: &[&str], data: Row) -> Result<Row, StoreError> {
        Ok(data)
    }
    async fn delete(&self, _table: &str, _filter: &Filter) -> Result<Vec<Row>, StoreError> {
        Ok(vec![])
    }
    async fn select(&self, _table: &str, _filter: &Filter, _page: &Page) -> Result<Vec<Row>, StoreError> {
        Ok(vec![])
    }
    async fn job_hash_exists(&self, _hash: &str, _window_minutes: i64) -> Result<Option<Row>, StoreError> {
        Ok(None)
    }
    async fn increment_batch_total(&self, _batch_id: &str) -> Result<(), StoreError> {
        Ok(())
    }
    async fn get_store_quota_status(&self, _store_id: &str) -> Result<Option<Row>, StoreError> {
        Ok(self.quota.lock().unwrap().clone())
    }
    async fn record_article_usage(&self, _store_id: &str, _post_id: &str, _usage_type: &str) -> Result<(), StoreError> {
        Ok(())
    }
    async fn record_subscription_event(&self, _store_id: &str, _event: Row) -> Result<(), StoreError> {
        Ok(())
    }
    async fn record_payment(&self, _store_id: &str, _payment: Row) -> Result<(), StoreError> {
        Ok(())
    }
    async fn sync_plan_limits_to_store(&self, _store_id: &str, _new_plan_id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

struct NoopCommerce;

#[async_trait]
impl CommerceApi for NoopCommerce {
    async fn rest(&self, _shop: &str, _request: RestRequest) -> Result<Value, RawApiError> {
        Ok(json!({}))
    }
    async fn graphql(&self, _shop: &str, _request: GraphQlRequest) -> Result<GraphQlResponse, RawApiError> {
        Ok(GraphQlResponse::default())
    }
    async fn list_active_subscriptions(&self, _shop: &str) -> Result<Vec<Value>, RawApiError> {
        Ok(vec![])
    }
    async fn fetch_subscription(&self, _shop: &str, subscription_id: &str) -> Result<Value, RawApiError> {
        Ok(json!({"id": subscription_id, "status": "ACTIVE"}))
    }
    async fn fetch_billing_preferences(&self, _shop: &str) -> Result<Value, RawApiError> {
        Ok(json!({}))
    }
}

struct NoopLlm;

#[async_trait]
impl LlmApi for NoopLlm {
    async fn generate_response(&self, _request: ResponseRequest) -> Result<ResponseResult, RawApiError> {
        Ok(ResponseResult::default())
    }
    async fn create_embedding(&self, _request: EmbeddingRequest) -> Result<EmbeddingResult, RawApiError> {
        Ok(EmbeddingResult::default())
    }
}

fn quota_row(remaining: i64) -> Row {
    let mut row = Row::new();
    row.insert("store_id".into(), json!("store-1"));
    row.insert("is_active".into(), json!(true));
    row.insert("is_paused".into(), json!(false));
    row.insert("articles_remaining".into(), json!(remaining));
    row
}

#[tokio::main]
async fn main() {
    let store = Arc::new(InMemoryStore::default());
    *store.quota.lock().unwrap() = Some(quota_row(1));

    let facade = build(
        store.clone(),
        Arc::new(ResultCache::new()),
        Arc::new(NoopCommerce),
        Arc::new(NoopLlm),
        GraphQlTier::Standard,
    );

    println!("-- First generate_article call (quota = 1) --");
    match facade.generate_article("store-1", json!({"topic": "winter boots"}), "corr-1").await {
        Ok(outcome) => println!("  enqueued: {:?}", outcome),
        Err(err) => println!("  denied: {err}"),
    }

    *store.quota.lock().unwrap() = Some(quota_row(0));

    println!("-- Second generate_article call (quota = 0) --");
    match facade.generate_article("store-1", json!({"topic": "spring sandals"}), "corr-2").await {
        Ok(outcome) => println!("  enqueued: {:?}", outcome),
        Err(FacadeError::QuotaDenied(reason)) => println!("  denied: {reason}"),
        Err(err) => println!("  denied: {err}"),
    }
}
