#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing API key for {provider_name}: {env_var} environment variable is not set")]
    MissingApiKey {
        provider_name: String,
        env_var: &'static str,
    },
}

/// Chat-completions endpoints the client knows defaults for.
///
/// The video travels as a `file` content part that only names its URI, so the
/// endpoint has to be able to fetch that URI itself. The public endpoints
/// below do not read `gs://` objects; point the client at an OpenAI-compatible
/// gateway in front of Vertex AI with `ChatCompletionsClient::with_api_url`
/// when the media lives in Cloud Storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-2.5-pro",
                env_var: "GEMINI_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-5.1",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Openai => "OpenAI",
            Provider::Grok => "Grok",
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String, ProviderError> {
        let config = self.config();
        std::env::var(config.env_var).map_err(|_| ProviderError::MissingApiKey {
            provider_name: self.name().to_string(),
            env_var: config.env_var,
        })
    }
}
