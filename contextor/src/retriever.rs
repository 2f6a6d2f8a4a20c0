//! Context retrieval with graceful degradation.
//!
//! 1. Ranked similarity search (top-K).
//! 2. On a dimension mismatch only: unranked fetch of a few documents.
//! 3. Any other failure, or a failing fallback: empty context.

use std::time::Duration;

use rag_store::{Document, join_context};
use tracing::{debug, info, warn};

use crate::providers::{DocumentStore, FailureKind, with_deadline};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_FALLBACK_LIMIT: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct ContextRetriever {
    pub top_k: usize,
    pub fallback_limit: usize,
    pub deadline: Duration,
}

impl Default for ContextRetriever {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
            deadline: Duration::from_secs(45),
        }
    }
}

impl ContextRetriever {
    /// Documents for `vector`; never fails, an empty list means "no context".
    pub async fn documents(&self, store: &dyn DocumentStore, vector: &[f32]) -> Vec<Document> {
        let ranked = with_deadline(
            "similarity search",
            self.deadline,
            store.similarity_search(vector, self.top_k),
        )
        .await;

        match ranked {
            Ok(docs) => {
                info!(retrieved = docs.len(), top_k = self.top_k, "similarity search done");
                docs
            }
            Err(f) if f.kind == FailureKind::DimensionMismatch => {
                warn!(detail = %f.detail, "vector search rejected, falling back to unranked fetch");
                match with_deadline("unranked fetch", self.deadline, store.fetch(self.fallback_limit))
                    .await
                {
                    Ok(docs) => {
                        info!(retrieved = docs.len(), "unranked fetch done");
                        docs
                    }
                    Err(f) => {
                        warn!(kind = ?f.kind, detail = %f.detail, "unranked fetch failed");
                        Vec::new()
                    }
                }
            }
            Err(f) => {
                warn!(kind = ?f.kind, detail = %f.detail, "similarity search failed");
                Vec::new()
            }
        }
    }

    /// Context blob for `vector`: document texts joined by a blank line.
    pub async fn context(&self, store: &dyn DocumentStore, vector: &[f32]) -> String {
        let docs = self.documents(store, vector).await;
        let blob = join_context(&docs);
        debug!(documents = docs.len(), context_chars = blob.chars().count(), "context assembled");
        blob
    }
}
