//! Errors surfaced by plan/trial transitions, distinct from
//! [`QuotaDecision`](crate::types::QuotaDecision). Both paths are
//! lock-gated the same way quota enforcement is, but unlike quota
//! enforcement they have no "deny with a reason" return shape of their
//! own, so lock contention surfaces as a typed error instead.

use ccp_core::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    #[error("lock for store {store_id} operation {operation} is already held")]
    LockHeld { store_id: String, operation: &'static str },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
