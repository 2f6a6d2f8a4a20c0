//! Shared Gemini service with two profiles: `generation` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - HTTP clients are built up front, one per profile; if both profiles point at
//!   the same config the client is shared.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let svc = Arc::new(LlmServiceProfiles::from_env()?);
//!
//!     let emb = svc.embed("Ferris").await?;
//!     println!("Embedding dim = {}", emb.len());
//!
//!     let txt = svc.generate("Say hello").await?;
//!     println!("{txt}");
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    config::{
        default_config::{config_gemini_embedding, config_gemini_generation},
        llm_model_config::LlmModelConfig,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::gemini_service::GeminiService,
};

/// Two logical Gemini profiles behind one handle.
pub struct LlmServiceProfiles {
    generation: Arc<GeminiService>,
    embedding: Arc<GeminiService>,
    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service from explicit configs.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if a client cannot be built (missing key, bad endpoint).
    pub fn new(
        generation: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let generation = Arc::new(GeminiService::new(generation)?);
        let embedding = if embedding == *generation.config() {
            Arc::clone(&generation)
        } else {
            Arc::new(GeminiService::new(embedding)?)
        };

        info!(
            generation_model = %generation.config().model,
            embedding_model = %embedding.config().model,
            "LlmServiceProfiles ready"
        );

        Ok(Self {
            generation,
            embedding,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Creates the service from `GEMINI_*` / `EMBEDDING_MODEL` / `LLM_*` variables.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_gemini_generation()?, config_gemini_embedding()?, Some(10))
    }

    /// Generates text using the **generation** profile.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        self.generation.generate(prompt).await
    }

    /// Computes an embedding using the **embedding** profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        self.embedding.embeddings(input).await
    }

    /// Returns a health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let (generation, embedding) = self.profiles();
        let mut list = vec![generation.clone()];
        if embedding != generation {
            list.push(embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(generation, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (self.generation.config(), self.embedding.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: &str, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: Some("k".into()),
            max_tokens: Some(500),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn routes_calls_to_the_right_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gen:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/emb:embedContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": {"values": [1.0, 2.0]}
            })))
            .mount(&server)
            .await;

        let svc = LlmServiceProfiles::new(
            cfg(&server.uri(), "gen"),
            cfg(&server.uri(), "emb"),
            Some(5),
        )
        .unwrap();

        assert_eq!(svc.generate("q").await.unwrap(), "ok");
        assert_eq!(svc.embed("q").await.unwrap(), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn health_dedupes_identical_profiles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let same = cfg(&server.uri(), "gen");
        let svc = LlmServiceProfiles::new(same.clone(), same, Some(5)).unwrap();
        let statuses = svc.health_all().await;
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].ok);
    }
}
