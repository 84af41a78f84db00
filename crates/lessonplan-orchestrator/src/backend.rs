//! Generative backend abstraction and the Gemini HTTP client.
//!
//! The orchestrator only needs "submit prompt text, receive completion text,
//! surface errors". [`GenerativeBackend`] captures that contract so the
//! pipeline can run against the real API or against a scripted fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{BackendErrorKind, LessonError, Result};

const X_GOOG_API_KEY: &str = "x-goog-api-key";

/// A text-completion service.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Submits `prompt` and returns the completion text.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Identifier of the model behind this backend, for logging.
    fn model(&self) -> &str;
}

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token ceiling.
    pub max_output_tokens: u32,
}

impl From<&BackendConfig> for GenerationConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Client for the Generative Language `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiBackend {
    api_key: String,
    model: String,
    api_base_url: String,
    generation_config: GenerationConfig,
    client: Client,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("generation_config", &self.generation_config)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GeminiBackend {
    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::MissingApiKey` if the key is blank, or a
    /// `ConfigValidationError` if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: &BackendConfig) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(LessonError::missing_api_key(&config.api_key_env));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                LessonError::config_validation(
                    format!("failed to create HTTP client: {e}"),
                    "Check the TLS configuration of this machine",
                )
            })?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            generation_config: GenerationConfig::from(config),
            client,
        })
    }

    /// Creates a client reading the API key from the environment variable
    /// named by `config.api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::MissingApiKey` if the variable is unset or blank.
    pub fn from_env(config: &BackendConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LessonError::missing_api_key(&config.api_key_env))?;
        Self::new(api_key, config)
    }

    /// The sampling parameters sent with every request.
    #[must_use]
    pub const fn generation_config(&self) -> GenerationConfig {
        self.generation_config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl ApiResponse {
    /// Joins the text parts of the first candidate.
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LessonError::empty_response(format!(
                "prompt blocked ({reason})"
            )));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(LessonError::empty_response("no candidates returned"));
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .map_or_else(|| "no text".to_string(), |r| format!("finish reason {r}"));
            return Err(LessonError::empty_response(reason));
        }

        Ok(text.to_string())
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ApiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.generation_config,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header(X_GOOG_API_KEY, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            return Err(LessonError::backend_api_error(
                BackendErrorKind::from_status(status.as_u16()),
                format!("HTTP {}: {message}", status.as_u16()),
            ));
        }

        let api_response: ApiResponse = response.json().await?;
        api_response.into_text()
    }

    fn model(&self) -> &str {
        &self.model
    }
}
