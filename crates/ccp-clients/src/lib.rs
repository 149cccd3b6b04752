//! External clients: thin adapters between the job queue/quota/batch
//! core and the commerce platform and LLM provider, built atop the retry
//! engine, rate limiter, and coalescer rather than any concrete HTTP stack.

pub mod commerce;
pub mod error;
pub mod llm;
mod retry_support;
mod ttl_cache;

pub use error::{ClientError, RawApiError};
