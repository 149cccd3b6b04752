//! `ccp` — the content-automation control plane.
//!
//! This crate is the facade over the ten `ccp-*` subsystem crates: each is
//! independently usable (and independently published) and re-exported here
//! behind a feature flag. On top of the re-exports, the `facades` feature
//! adds three domain-level operations — [`facade::Facade::generate_article`],
//! [`facade::Facade::mine_keywords`] and
//! [`facade::Facade::create_subscription`] — that compose the subsystems
//! the way a caller actually uses them: acquire a lock, enforce quota,
//! enqueue work or call an external client.
//!
//! ```text
//! generate article / mine keywords / create subscription
//!        |
//!        v
//!   QuotaManager::enforce_quota_with_lock   (ccp-quota)
//!        |
//!        v
//!   JobQueue::enqueue  /  CommerceClient / LlmClient call   (ccp-jobqueue / ccp-clients)
//!        |                        |
//!        v                        v
//!   DatabaseBatch (ccp-batch)   rate limiter -> retry -> coalescer (ccp-ratelimiter / ccp-retry / ccp-coalesce)
//! ```

pub mod observability;

#[cfg(feature = "facades")]
pub mod facade;

// Re-export core (always available)
pub use ccp_core as core;

#[cfg(feature = "classifier")]
pub use ccp_classifier as classifier;

#[cfg(feature = "retry")]
pub use ccp_retry as retry;

#[cfg(feature = "ratelimiter")]
pub use ccp_ratelimiter as ratelimiter;

#[cfg(feature = "cache")]
pub use ccp_cache as cache;

#[cfg(feature = "coalesce")]
pub use ccp_coalesce as coalesce;

#[cfg(feature = "jobqueue")]
pub use ccp_jobqueue as jobqueue;

#[cfg(feature = "quota")]
pub use ccp_quota as quota;

#[cfg(feature = "batch")]
pub use ccp_batch as batch;

#[cfg(feature = "clients")]
pub use ccp_clients as clients;
