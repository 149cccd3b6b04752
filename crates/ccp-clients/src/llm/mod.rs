//! The LLM provider adapter: response generation and embeddings, layered
//! on the same retry/rate-limit primitives as the commerce clients.

mod embeddings;
mod responses;
mod transport;

pub use embeddings::EmbeddingsClient;
pub use responses::ResponsesClient;
pub use transport::{EmbeddingRequest, EmbeddingResult, LlmApi, ResponseRequest, ResponseResult, TokenUsage};

use std::sync::Arc;

/// Bundles the responses and embeddings clients behind one shared API
/// handle, the way a caller actually wants to hold an LLM client.
pub struct LlmClient {
    pub responses: ResponsesClient,
    pub embeddings: EmbeddingsClient,
}

impl LlmClient {
    pub fn new(api: Arc<dyn LlmApi>) -> Self {
        Self { responses: ResponsesClient::new(api.clone()), embeddings: EmbeddingsClient::new(api) }
    }
}
