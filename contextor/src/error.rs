//! Typed error for the contextor crate.

use thiserror::Error;

/// Failures while assembling a pipeline. Request handling itself never errors.
#[derive(Debug, Error)]
pub enum ContextorError {
    /// Gemini profiles could not be configured.
    #[error("LLM setup error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Errors from the underlying rag-store crate.
    #[error("RAG setup error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// Invalid pipeline knob.
    #[error("config error: {0}")]
    Config(String),
}
