use async_trait::async_trait;

use crate::{metrics::StageMetrics, provider::ProviderError, types::MediaRef};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Inference service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid API response: {0}")]
    InvalidApiResponse(serde_json::Value),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// One multimodal request: the rendered prompt, the asset it is about, and the
/// JSON shape the answer should take.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub prompt: String,
    pub media: MediaRef,
    pub output_schema: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// The external model call. Implementations own their retry policy and report
/// each retry through [`StageMetrics::record_retry`].
#[async_trait]
pub trait Inference: Send + Sync {
    async fn infer(
        &self,
        request: &InferenceRequest,
        metrics: &StageMetrics,
    ) -> Result<Completion, InferenceError>;
}
