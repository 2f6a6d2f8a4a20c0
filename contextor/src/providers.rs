//! Seams between the pipeline and its external collaborators.
//!
//! Each adapter turns provider-specific failures into a [`FailureKind`]; the
//! pipeline only ever switches on that kind. Status codes and message text are
//! inspected in `ai-llm-service` and `rag-store`, never here.

use std::{future::Future, pin::Pin, time::Duration};

use ai_llm_service::{AiLlmError, LlmErrorKind, LlmServiceProfiles};
use rag_store::{Document, RagError, RagErrorKind, RagStore};
use thiserror::Error;

/// Stable failure categories seen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Quota exhausted / HTTP 429.
    RateLimited,
    /// Query vector does not fit the collection.
    DimensionMismatch,
    /// The call exceeded its deadline.
    Timeout,
    /// Everything else.
    Unavailable,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {detail}")]
pub struct ProviderFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl ProviderFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<AiLlmError> for ProviderFailure {
    fn from(e: AiLlmError) -> Self {
        let kind = match e.kind() {
            LlmErrorKind::RateLimited => FailureKind::RateLimited,
            LlmErrorKind::Timeout => FailureKind::Timeout,
            _ => FailureKind::Unavailable,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<RagError> for ProviderFailure {
    fn from(e: RagError) -> Self {
        let kind = match e.kind() {
            RagErrorKind::DimensionMismatch => FailureKind::DimensionMismatch,
            RagErrorKind::Timeout => FailureKind::Timeout,
            RagErrorKind::Unavailable => FailureKind::Unavailable,
        };
        Self::new(kind, e.to_string())
    }
}

pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderFailure>> + Send + 'a>>;

/// Turns a question into a query vector.
pub trait QueryEmbedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> ProviderFuture<'a, Vec<f32>>;
}

/// Produces answer text from a fully built prompt.
pub trait AnswerGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> ProviderFuture<'a, String>;
}

/// Read side of the vector store.
pub trait DocumentStore: Send + Sync {
    /// Ranked nearest neighbours of `vector`.
    fn similarity_search<'a>(&'a self, vector: &'a [f32], k: usize) -> ProviderFuture<'a, Vec<Document>>;
    /// Up to `k` documents, unranked.
    fn fetch<'a>(&'a self, k: usize) -> ProviderFuture<'a, Vec<Document>>;
}

impl QueryEmbedder for LlmServiceProfiles {
    fn embed<'a>(&'a self, text: &'a str) -> ProviderFuture<'a, Vec<f32>> {
        Box::pin(async move { LlmServiceProfiles::embed(self, text).await.map_err(Into::into) })
    }
}

impl AnswerGenerator for LlmServiceProfiles {
    fn generate<'a>(&'a self, prompt: &'a str) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            LlmServiceProfiles::generate(self, prompt)
                .await
                .map_err(Into::into)
        })
    }
}

impl DocumentStore for RagStore {
    fn similarity_search<'a>(&'a self, vector: &'a [f32], k: usize) -> ProviderFuture<'a, Vec<Document>> {
        Box::pin(async move {
            RagStore::similarity_search(self, vector, k)
                .await
                .map_err(Into::into)
        })
    }

    fn fetch<'a>(&'a self, k: usize) -> ProviderFuture<'a, Vec<Document>> {
        Box::pin(async move { RagStore::fetch(self, k).await.map_err(Into::into) })
    }
}

/// Runs `fut` with a deadline; expiry becomes [`FailureKind::Timeout`].
pub async fn with_deadline<T>(
    stage: &'static str,
    deadline: Duration,
    fut: impl Future<Output = Result<T, ProviderFailure>>,
) -> Result<T, ProviderFailure> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(r) => r,
        Err(_) => Err(ProviderFailure::new(
            FailureKind::Timeout,
            format!("{stage} exceeded {deadline:?}"),
        )),
    }
}
