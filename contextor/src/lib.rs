//! Retrieval-augmented answer pipeline for the portfolio assistant.
//!
//! Public API: [`ChatPipeline::answer`]. It validates the conversation, spaces
//! provider calls through a shared [`RateLimiter`], embeds the question,
//! retrieves context from `rag-store` (falling back to an unranked fetch on a
//! vector dimension mismatch), builds the persona prompt, calls Gemini, and
//! degrades to canned answers whenever a stage fails.
//!
//! # Example
//! ```no_run
//! # use std::sync::Arc;
//! # use contextor::{ChatMessage, ChatPipeline, RateLimiter};
//! # #[tokio::main] async fn main() {
//! let limiter = Arc::new(RateLimiter::default());
//! let pipeline = ChatPipeline::from_env(limiter).unwrap();
//! let reply = pipeline.answer(&[ChatMessage::user("What has Prince built?")]).await;
//! println!("{}", reply.message.content);
//! # }
//! ```

mod api_types;
mod cfg;
mod error;
pub mod fallback;
mod pipeline;
pub mod prompt;
mod providers;
mod rate_limiter;
mod retriever;

pub use api_types::{AnswerResult, ChatMessage, Role};
pub use cfg::ContextorConfig;
pub use error::ContextorError;
pub use pipeline::{ChatPipeline, Outcome, PipelineReply};
pub use providers::{
    AnswerGenerator, DocumentStore, FailureKind, ProviderFailure, ProviderFuture, QueryEmbedder,
};
pub use rate_limiter::{DEFAULT_MIN_INTERVAL, RateLimiter};
pub use retriever::ContextRetriever;
