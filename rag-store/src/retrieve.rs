//! Retrieval helpers: ranked vector search and unranked fetch.

use serde_json::json;
use tracing::{debug, trace};

use crate::astra_facade::AstraFacade;
use crate::errors::RagError;
use crate::record::Document;

/// Top-`k` documents ordered by similarity to `query_vector`.
///
/// # Errors
/// Data API and transport failures; dimension problems surface as
/// `RagErrorKind::DimensionMismatch` through [`RagError::kind`].
pub async fn similarity_search(
    client: &AstraFacade,
    query_vector: &[f32],
    top_k: usize,
) -> Result<Vec<Document>, RagError> {
    trace!(top_k, dim = query_vector.len(), "retrieve::similarity_search");
    let docs = client.find(json!({}), Some(query_vector), top_k).await?;
    debug!(hits = docs.len(), "similarity search finished");
    Ok(docs)
}

/// Up to `limit` documents in storage order, no ranking.
pub async fn fetch(client: &AstraFacade, limit: usize) -> Result<Vec<Document>, RagError> {
    trace!(limit, "retrieve::fetch");
    let docs = client.find(json!({}), None, limit).await?;
    debug!(hits = docs.len(), "unranked fetch finished");
    Ok(docs)
}
