//! Demonstrates all three domain facades end-to-end against in-memory test
//! doubles: `generate_article`, `mine_keywords`, and `create_subscription`
//! reconciling a webhook status before transitioning the plan.

use async_trait::async_trait;
use ccp::facade::build;
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
        let mut quota = self.quota.lock().unwrap();
        if let Some(row) = quota.as_mut() {
            for (k, v) in data.iter() {
                row.insert(k.clone(), v.clone());
            }
        }
        Ok(vec![])
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

/// A commerce double whose `list_active_subscriptions` doesn't yet know
/// about `sub_1` — the facade must fall back to `fetch_subscription` to
/// discover it's actually active before trusting the webhook.
struct LaggingCommerce;

#[async_trait]
impl CommerceApi for LaggingCommerce {
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
        Ok(json!({"currency": "USD"}))
    }
}

struct NoopLlm;

#[async_trait]
impl LlmApi for NoopLlm {
    async fn generate_response(&self, _request: ResponseRequest) -> Result<ResponseResult, RawApiError> {
        Ok(ResponseResult { text: Some("draft text".into()), ..Default::default() })
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
    *store.quota.lock().unwrap() = Some(quota_row(10));

    let facade = build(store, Arc::new(ResultCache::new()), Arc::new(LaggingCommerce), Arc::new(NoopLlm), GraphQlTier::Plus);

    println!("-- generate_article --");
    let outcome = facade.generate_article("store-1", json!({"topic": "summer dresses"}), "corr-1").await.unwrap();
    println!("  {outcome:?}");

    println!("-- mine_keywords --");
    let outcome = facade.mine_keywords("store-1", json!({"seed": "running shoes"}), "corr-2").await.unwrap();
    println!("  {outcome:?}");

    println!("-- create_subscription (webhook says ACTIVE, platform list is stale) --");
    let status = facade.create_subscription("store-1", "shop1", "sub_1", "plan_growth", "ACTIVE", "corr-3").await.unwrap();
    println!("  reconciled status: {status:?}");
}
