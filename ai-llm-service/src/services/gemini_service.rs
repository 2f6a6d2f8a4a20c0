//! Gemini service for text generation and embeddings.
//!
//! Minimal, non-streaming client around the Generative Language REST API.
//! Endpoints are derived from [`LlmModelConfig::model_url`]:
//! - POST {endpoint}/v1beta/models/{model}:generateContent: single-turn generation
//! - POST {endpoint}/v1beta/models/{model}:embedContent:    embeddings retrieval
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Quota exhaustion (HTTP 429 / `RESOURCE_EXHAUSTED`) is reported as
//! [`ProviderErrorKind::QuotaExhausted`] so callers can tell it apart from
//! other upstream failures.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, ConfigError, Provider, ProviderError, ProviderErrorKind},
};

/// Thin client for the Gemini API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (timeout + API key header).
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
    url_embed: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if `cfg.api_key` is `None`
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::Config`] with `EmptyModel` if `cfg.model` is blank
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::new(Provider::Gemini, ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        if cfg.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));

        let mut headers = header::HeaderMap::new();
        let mut key_value = header::HeaderValue::from_str(api_key.trim()).map_err(|e| {
            ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
            )
        })?;
        key_value.set_sensitive(true);
        headers.insert("x-goog-api-key", key_value);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let model_url = cfg.model_url();
        let url_generate = format!("{model_url}:generateContent");
        let url_embed = format!("{model_url}:embedContent");

        info!(
            model = %cfg.model,
            endpoint = %cfg.base_url(),
            timeout_secs = timeout.as_secs(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
            url_embed,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Sends `prompt` as a single user turn and returns the concatenated text
    /// of the first candidate.
    ///
    /// Mapped options from config: `maxOutputTokens`, `temperature`, `topP`.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::QuotaExhausted`] on 429 / quota wording
    /// - [`ProviderErrorKind::HttpStatus`] for other non-2xx responses
    /// - [`ProviderErrorKind::Blocked`] if the prompt was filtered
    /// - [`ProviderErrorKind::EmptyCandidates`] if no text came back
    /// - [`AiLlmError::HttpTransport`] for client/network failures (including timeouts)
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = GenerateRequest::from_cfg(&self.cfg, prompt);

        debug!(prompt_len = prompt.len(), "POST {}", self.url_generate);

        let resp = self.client.post(&self.url_generate).json(&body).send().await?;

        if !resp.status().is_success() {
            return Err(self.status_error(resp, &self.url_generate, started).await);
        }

        let out: GenerateResponse = resp.json().await.map_err(|e| {
            error!(error = %e, latency_ms = started.elapsed().as_millis(), "failed to decode generateContent response");
            ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `candidates[0].content.parts[].text`"
                )),
            )
        })?;

        let text = out.first_text();
        if text.is_empty() {
            if let Some(reason) = out.prompt_feedback.and_then(|f| f.block_reason) {
                warn!(%reason, "prompt blocked by provider");
                return Err(
                    ProviderError::new(Provider::Gemini, ProviderErrorKind::Blocked(reason)).into(),
                );
            }
            return Err(
                ProviderError::new(Provider::Gemini, ProviderErrorKind::EmptyCandidates).into(),
            );
        }

        info!(
            latency_ms = started.elapsed().as_millis(),
            answer_len = text.len(),
            "generateContent completed"
        );

        Ok(text)
    }

    /// Retrieves a single embedding vector via `embedContent`.
    ///
    /// # Errors
    /// Same HTTP/transport failures as [`GeminiService::generate`], plus
    /// [`ProviderErrorKind::Decode`] if `embedding.values` is missing or empty.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let model = format!("models/{}", self.cfg.model);
        let body = EmbedRequest {
            model: &model,
            content: Content {
                role: None,
                parts: vec![Part { text: input }],
            },
        };

        debug!(input_len = input.len(), "POST {}", self.url_embed);

        let resp = self.client.post(&self.url_embed).json(&body).send().await?;

        if !resp.status().is_success() {
            return Err(self.status_error(resp, &self.url_embed, started).await);
        }

        let out: EmbedResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `embedding.values`")),
            )
        })?;

        if out.embedding.values.is_empty() {
            return Err(ProviderError::new(
                Provider::Gemini,
                ProviderErrorKind::Decode("embedding.values is empty".into()),
            )
            .into());
        }

        debug!(
            dim = out.embedding.values.len(),
            latency_ms = started.elapsed().as_millis(),
            "embedContent completed"
        );

        Ok(out.embedding.values)
    }

    async fn status_error(&self, resp: reqwest::Response, url: &str, started: Instant) -> AiLlmError {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let err = ProviderError::from_status(Provider::Gemini, status, url.to_string(), &text);

        match &err.kind {
            ProviderErrorKind::QuotaExhausted(_) => warn!(
                %status,
                %url,
                latency_ms = started.elapsed().as_millis(),
                "Gemini quota exhausted"
            ),
            _ => error!(
                %status,
                %url,
                error = %err,
                latency_ms = started.elapsed().as_millis(),
                "Gemini returned non-success status"
            ),
        }
        err.into()
    }
}

/* ------------------------------------------------------------------------- */
/* Wire types                                                                */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn from_cfg(cfg: &LlmModelConfig, prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: cfg.max_tokens,
                temperature: cfg.temperature,
                top_p: cfg.top_p,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentOut>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Response body for `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateResponse {
    fn first_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Request body for `embedContent`.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

/// Response body for `embedContent`.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}
