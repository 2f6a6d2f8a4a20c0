//! Health probes for the Gemini model profiles.
//!
//! Probe: `GET {endpoint}/v1beta/models/{model}` with the API key header.
//! A 2xx answer means the key is accepted and the model exists.
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for `/api/health`.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`).
//! The raw probe ([`HealthService::try_probe_gemini`]) returns a strict `Result`.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single model config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend name (always "Gemini" today).
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier that was probed.
    pub model: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    #[inline]
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: "Gemini".to_string(),
            endpoint: cfg.base_url().to_string(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks a single config. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        if let Err(err) = probe_endpoint(cfg) {
            warn!(endpoint = %cfg.endpoint, "invalid endpoint (empty or missing http/https)");
            return HealthStatus::new(cfg, false, 0, err.to_string());
        }

        let start = Instant::now();
        match self.try_probe_gemini(cfg).await {
            Ok(status) => {
                info!(
                    model = %cfg.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    model = %cfg.model,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Checks several configs sequentially.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Strict Gemini probe.
    ///
    /// # Errors
    /// - [`HealthError::InvalidEndpoint`] if the endpoint is empty or not http(s)
    /// - [`HealthError::Decode`] if the API key is missing
    /// - [`HealthError::HttpStatus`] for non-2xx answers
    /// - [`AiLlmError::HttpTransport`] for network failures
    pub async fn try_probe_gemini(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        probe_endpoint(cfg)?;
        let url = cfg.model_url();
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout);

        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing Gemini API key".into()))?;

        let start = Instant::now();
        debug!(model = %cfg.model, "GET {}", url);

        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .header("x-goog-api-key", api_key)
            .send()
            .await?;

        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %url,
                %status,
                %snippet,
                latency_ms = latency,
                "health GET model returned non-success status"
            );

            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        Ok(HealthStatus::new(
            cfg,
            true,
            latency,
            "Gemini is healthy; model is available",
        ))
    }
}

fn probe_endpoint(cfg: &LlmModelConfig) -> Result<(), HealthError> {
    let endpoint = cfg.endpoint.trim();
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: String) -> LlmModelConfig {
        LlmModelConfig {
            model: "gemini-1.5-flash".into(),
            endpoint,
            api_key: Some("k".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn healthy_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models/gemini-1.5-flash"))
            .and(header("x-goog-api-key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "models/gemini-1.5-flash"
            })))
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(5)).unwrap();
        let status = svc.check(&cfg(server.uri())).await;
        assert!(status.ok, "{}", status.message);
        assert_eq!(status.model.as_deref(), Some("gemini-1.5-flash"));
    }

    #[tokio::test]
    async fn unknown_model_is_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(5)).unwrap();
        let status = svc.check(&cfg(server.uri())).await;
        assert!(!status.ok);
        assert!(status.message.contains("404"));
    }

    #[tokio::test]
    async fn invalid_endpoint_short_circuits() {
        let svc = HealthService::new(Some(5)).unwrap();
        let status = svc.check(&cfg("ftp://nowhere".into())).await;
        assert!(!status.ok);
        assert_eq!(status.latency_ms, 0);
        assert!(status.message.contains("ftp://nowhere"));

        let err = svc.try_probe_gemini(&cfg(String::new())).await.unwrap_err();
        assert!(matches!(err, AiLlmError::Health(HealthError::InvalidEndpoint(_))));
    }
}
