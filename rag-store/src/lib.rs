//! High-level RAG facade over the Astra DB Data API: retrieval + ingestion.
//!
//! This crate provides a clean API to:
//! - Run a ranked similarity search or an unranked fetch for context
//! - Inspect a stored document (health reporting)
//! - Create the vector collection and ingest web pages / files into it
//!
//! The design is flat and splits responsibilities into focused modules.

mod astra_facade;
mod config;
mod embed;
mod errors;
mod ingest;
mod loader;
mod record;
mod retrieve;
mod splitter;

pub use config::{RagConfig, SimilarityMetric, VectorSpace};
pub use embed::{EmbeddingsProvider, gemini::GeminiEmbedder};
pub use errors::{RagError, RagErrorKind};
pub use ingest::{IngestOptions, IngestReport};
pub use loader::Source;
pub use record::{CONTEXT_SEPARATOR, ChunkRecord, Document, join_context};
pub use splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, RecursiveCharacterSplitter};

use serde_json::json;
use tracing::{debug, trace};

/// High-level facade that wires configuration and the Data API client.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    client: astra_facade::AstraFacade,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the configuration is invalid.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        trace!(collection = %cfg.collection, "RagStore::new");
        let client = astra_facade::AstraFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    /// Builds the store from `ASTRA_DB_*` environment variables.
    pub fn from_env() -> Result<Self, RagError> {
        Self::new(RagConfig::from_env()?)
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Ranked nearest-neighbour search.
    pub async fn similarity_search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Document>, RagError> {
        retrieve::similarity_search(&self.client, query_vector, top_k).await
    }

    /// Unranked fetch of up to `limit` documents.
    pub async fn fetch(&self, limit: usize) -> Result<Vec<Document>, RagError> {
        retrieve::fetch(&self.client, limit).await
    }

    /// Any one stored document, used to report the collection's field layout.
    pub async fn sample_document(&self) -> Result<Option<Document>, RagError> {
        let doc = self.client.find_one(json!({})).await?;
        debug!(
            found = doc.is_some(),
            fields = ?doc.as_ref().map(Document::fields),
            "sampled collection"
        );
        Ok(doc)
    }

    /// Creates the collection if missing. Returns `true` when it was created.
    pub async fn ensure_collection(&self, space: &VectorSpace) -> Result<bool, RagError> {
        self.client.ensure_collection(space).await
    }

    /// Stores one chunk with its vector.
    pub async fn insert_one(&self, text: &str, vector: Vec<f32>) -> Result<Option<String>, RagError> {
        if vector.len() != self.cfg.embedding_dim {
            return Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want: self.cfg.embedding_dim,
            });
        }
        self.client
            .insert_one(&ChunkRecord {
                vector,
                text: text.to_string(),
            })
            .await
    }

    /// Loads, splits, embeds and stores every source.
    ///
    /// # Errors
    /// Setup failures only; per-source results are in the [`IngestReport`].
    pub async fn ingest_sources(
        &self,
        provider: &dyn EmbeddingsProvider,
        splitter: &RecursiveCharacterSplitter,
        sources: &[Source],
        opts: &IngestOptions,
    ) -> Result<IngestReport, RagError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.cfg.timeout_secs))
            .build()?;
        ingest::ingest_sources(&self.client, provider, splitter, &http, sources, opts).await
    }
}
