//! Gemini embedding provider backed by the shared `LlmServiceProfiles`.

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use tracing::warn;

use crate::{EmbeddingsProvider, RagError};

/// Embeds text with the `embedding` profile and checks the dimension.
#[derive(Clone)]
pub struct GeminiEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl GeminiEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: usize) -> Self {
        Self { svc, dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl EmbeddingsProvider for GeminiEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>
    {
        Box::pin(async move {
            let v = self
                .svc
                .embed(text)
                .await
                .map_err(|e| RagError::Embedding(e.to_string()))?;

            if v.len() != self.dim {
                warn!(got = v.len(), want = self.dim, "embedding dimension mismatch");
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }

            Ok(v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::LlmModelConfig;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn svc(values: Vec<f32>) -> (MockServer, Arc<LlmServiceProfiles>) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embedding": {"values": values}})),
            )
            .mount(&server)
            .await;
        let cfg = LlmModelConfig {
            model: "text-embedding-004".into(),
            endpoint: server.uri(),
            api_key: Some("k".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(5),
        };
        let profiles = LlmServiceProfiles::new(cfg.clone(), cfg, Some(5)).unwrap();
        (server, Arc::new(profiles))
    }

    #[tokio::test]
    async fn accepts_expected_dimension() {
        let (_server, svc) = svc(vec![0.0; 4]).await;
        let v = GeminiEmbedder::new(svc, 4).embed("x").await.unwrap();
        assert_eq!(v.len(), 4);
    }

    #[tokio::test]
    async fn rejects_wrong_dimension() {
        let (_server, svc) = svc(vec![0.0; 3]).await;
        let err = GeminiEmbedder::new(svc, 4).embed("x").await.unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 4 }));
    }
}
