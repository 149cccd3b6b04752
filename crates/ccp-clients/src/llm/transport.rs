//! The LLM provider's HTTP surface is out of scope, same as the
//! commerce platform's: this trait is the narrow request-execution
//! interface the responses and embeddings adapters depend on.

use crate::error::RawApiError;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ResponseRequest {
    pub model: String,
    pub prompt: String,
    pub metadata: Value,
}

/// Parsed under a permissive schema: every field optional, since the
/// provider's payload shape varies by model and is never in our control.
#[derive(Debug, Clone, Default)]
pub struct ResponseResult {
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: String,
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingResult {
    pub vector: Vec<f32>,
}

#[async_trait]
pub trait LlmApi: Send + Sync {
    async fn generate_response(&self, request: ResponseRequest) -> Result<ResponseResult, RawApiError>;
    async fn create_embedding(&self, request: EmbeddingRequest) -> Result<EmbeddingResult, RawApiError>;
}
