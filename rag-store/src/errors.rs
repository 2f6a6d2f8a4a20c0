//! Unified error types for the crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Embedding length differs from the collection dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Transport failure talking to the Data API or an ingestion source.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer.
    #[error("http status {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Data API answered with an `errors` array.
    #[error("data api error [{code}]: {message}")]
    Api { code: String, message: String },

    /// Embedding provider failure during ingestion.
    #[error("embedding error: {0}")]
    Embedding(String),
}

/// Failure category consumed by the answer pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RagErrorKind {
    /// The query vector does not fit the collection's index.
    DimensionMismatch,
    /// The request exceeded its deadline.
    Timeout,
    /// Anything else: store down, auth rejected, bad config.
    Unavailable,
}

impl RagError {
    pub fn kind(&self) -> RagErrorKind {
        match self {
            RagError::VectorSizeMismatch { .. } => RagErrorKind::DimensionMismatch,
            RagError::Api { code, message } if mentions_dimension(code, message) => {
                RagErrorKind::DimensionMismatch
            }
            RagError::HttpStatus { snippet, .. } if mentions_dimension("", snippet) => {
                RagErrorKind::DimensionMismatch
            }
            RagError::Http(e) if e.is_timeout() => RagErrorKind::Timeout,
            _ => RagErrorKind::Unavailable,
        }
    }
}

/// Data API reports vector problems with codes like `VECTOR_SIZE_MISMATCH` or
/// messages mentioning the vector dimension.
fn mentions_dimension(code: &str, message: &str) -> bool {
    if code.to_ascii_uppercase().contains("VECTOR") {
        return true;
    }
    let lower = message.to_lowercase();
    lower.contains("vector") || lower.contains("dimension")
}

pub(crate) fn make_snippet(text: &str) -> String {
    const MAX: usize = 240;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        trimmed.chars().take(MAX).collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_vector_errors_are_dimension_mismatch() {
        let e = RagError::Api {
            code: "SHRED_BAD_VECTOR_SIZE".into(),
            message: "Vector size mismatch".into(),
        };
        assert_eq!(e.kind(), RagErrorKind::DimensionMismatch);

        let e = RagError::Api {
            code: "INVALID_REQUEST".into(),
            message: "Query embedding has dimension 3 but index expects 768".into(),
        };
        assert_eq!(e.kind(), RagErrorKind::DimensionMismatch);
    }

    #[test]
    fn other_api_errors_are_unavailable() {
        let e = RagError::Api {
            code: "COLLECTION_NOT_EXIST".into(),
            message: "Collection does not exist".into(),
        };
        assert_eq!(e.kind(), RagErrorKind::Unavailable);
        assert_eq!(RagError::Config("x".into()).kind(), RagErrorKind::Unavailable);
    }

    #[test]
    fn local_size_check_is_dimension_mismatch() {
        let e = RagError::VectorSizeMismatch { got: 3, want: 768 };
        assert_eq!(e.kind(), RagErrorKind::DimensionMismatch);
    }
}
