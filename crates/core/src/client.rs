use std::time::Duration;

use async_trait::async_trait;

use crate::{
    inference::{Completion, Inference, InferenceError, InferenceRequest, TokenUsage},
    metrics::StageMetrics,
    provider::Provider,
};

/// `Inference` over an OpenAI-compatible chat-completions endpoint.
///
/// Transport errors, 429 and 5xx responses are retried with exponential
/// backoff up to `max_retries` times; every retry is counted on the stage.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    backoff: Duration,
}

impl ChatCompletionsClient {
    pub fn new(
        provider: &Provider,
        model: Option<String>,
        timeout: Option<Duration>,
        max_retries: u32,
    ) -> Result<Self, InferenceError> {
        let config = provider.config();
        let api_key = provider.validate_api_key()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url.to_string(),
            api_key,
            model: model.unwrap_or_else(|| config.model.to_string()),
            max_retries,
            backoff: Duration::from_millis(500),
        })
    }

    /// Send requests to `api_url` instead of the provider's public endpoint.
    /// The provider still decides the API key and the default model.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn request_body(&self, request: &InferenceRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": request.prompt },
                        {
                            "type": "file",
                            "file": {
                                "file_id": request.media.uri,
                                "format": request.media.mime_type,
                            },
                        },
                    ],
                },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "segment", "schema": request.output_schema },
            },
            "temperature": 0.2,
        })
    }

    async fn send(&self, body: &serde_json::Value) -> Result<Completion, InferenceError> {
        let response = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl Inference for ChatCompletionsClient {
    async fn infer(
        &self,
        request: &InferenceRequest,
        metrics: &StageMetrics,
    ) -> Result<Completion, InferenceError> {
        let body = self.request_body(request);
        let mut attempt = 0;

        loop {
            match self.send(&body).await {
                Ok(completion) => return Ok(completion),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    metrics.record_retry();
                    let delay = self.backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(attempt, ?delay, "inference call failed, retrying: {e}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_retryable(error: &InferenceError) -> bool {
    match error {
        InferenceError::Status { status, .. } => *status == 429 || (500..600).contains(status),
        InferenceError::HttpError(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// Extract the message text and token usage from a chat-completions response
fn parse_completion(response: serde_json::Value) -> Result<Completion, InferenceError> {
    let Some(text) = response["choices"][0]["message"]["content"].as_str() else {
        return Err(InferenceError::InvalidApiResponse(response));
    };

    let usage = TokenUsage {
        input_tokens: response["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        output_tokens: response["usage"]["completion_tokens"].as_u64().unwrap_or(0),
    };

    Ok(Completion {
        text: text.to_string(),
        usage,
    })
}
