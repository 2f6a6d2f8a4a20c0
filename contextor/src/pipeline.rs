//! Answer pipeline: validate → rate-limit → embed → retrieve → rate-limit →
//! generate → respond.
//!
//! Every request ends in exactly one [`PipelineReply`]. Provider failures are
//! absorbed into degraded replies; only a panic inside a stage produces
//! [`Outcome::ServerError`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_llm_service::LlmServiceProfiles;
use futures::FutureExt;
use rag_store::RagStore;
use tracing::{debug, error, info, instrument, warn};

use crate::api_types::{AnswerResult, ChatMessage};
use crate::cfg::ContextorConfig;
use crate::error::ContextorError;
use crate::fallback::{self, ASK_PROMPT, RATE_LIMIT_NOTICE, SERVER_ERROR};
use crate::prompt::PromptBuilder;
use crate::providers::{AnswerGenerator, DocumentStore, FailureKind, QueryEmbedder, with_deadline};
use crate::rate_limiter::RateLimiter;
use crate::retriever::ContextRetriever;

/// Which terminal state produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No usable question in the request.
    AskForQuestion,
    /// Canned answer; no context or generation failed.
    Fallback,
    /// Generator reported quota exhaustion.
    RateLimitNotice,
    /// Generated text.
    Answered,
    /// Unexpected failure inside the pipeline.
    ServerError,
}

impl Outcome {
    /// Everything except [`Outcome::ServerError`] is a successful response.
    pub fn is_success(self) -> bool {
        !matches!(self, Outcome::ServerError)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReply {
    pub outcome: Outcome,
    pub message: AnswerResult,
}

impl PipelineReply {
    fn new(outcome: Outcome, content: impl Into<String>) -> Self {
        Self {
            outcome,
            message: AnswerResult::assistant(content),
        }
    }

    /// Reply used when the pipeline cannot run at all.
    pub fn server_error() -> Self {
        Self::new(Outcome::ServerError, SERVER_ERROR)
    }
}

pub struct ChatPipeline {
    embedder: Arc<dyn QueryEmbedder>,
    generator: Arc<dyn AnswerGenerator>,
    store: Arc<dyn DocumentStore>,
    limiter: Arc<RateLimiter>,
    retriever: ContextRetriever,
    prompt: PromptBuilder,
    stage_timeout: Duration,
}

impl ChatPipeline {
    /// The limiter is shared so that every pipeline in a process draws from
    /// the same call budget.
    pub fn new(
        embedder: Arc<dyn QueryEmbedder>,
        generator: Arc<dyn AnswerGenerator>,
        store: Arc<dyn DocumentStore>,
        limiter: Arc<RateLimiter>,
        cfg: &ContextorConfig,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            limiter,
            retriever: ContextRetriever {
                top_k: cfg.top_k,
                fallback_limit: cfg.fallback_limit,
                deadline: cfg.stage_timeout,
            },
            prompt: PromptBuilder::new(cfg.max_ctx_chars),
            stage_timeout: cfg.stage_timeout,
        }
    }

    /// Wires the Gemini profiles (embedding + generation) and the Astra store.
    pub fn from_services(
        profiles: Arc<LlmServiceProfiles>,
        store: Arc<RagStore>,
        limiter: Arc<RateLimiter>,
        cfg: &ContextorConfig,
    ) -> Self {
        Self::new(profiles.clone(), profiles, store, limiter, cfg)
    }

    /// # Errors
    /// Any missing or invalid environment variable of the three crates.
    pub fn from_env(limiter: Arc<RateLimiter>) -> Result<Self, ContextorError> {
        let cfg = ContextorConfig::from_env()?;
        let profiles = Arc::new(LlmServiceProfiles::from_env()?);
        let store = Arc::new(RagStore::from_env()?);
        Ok(Self::from_services(profiles, store, limiter, &cfg))
    }

    /// Answers the latest message of a conversation. Never fails.
    #[instrument(skip_all, fields(messages = messages.len()))]
    pub async fn answer(&self, messages: &[ChatMessage]) -> PipelineReply {
        match AssertUnwindSafe(self.run(messages)).catch_unwind().await {
            Ok(reply) => {
                info!(outcome = ?reply.outcome, "request answered");
                reply
            }
            Err(_) => {
                error!("pipeline panicked");
                PipelineReply::server_error()
            }
        }
    }

    async fn run(&self, messages: &[ChatMessage]) -> PipelineReply {
        let Some(question) = messages
            .last()
            .map(|m| m.content.as_str())
            .filter(|q| !q.trim().is_empty())
        else {
            debug!("no question in request");
            return PipelineReply::new(Outcome::AskForQuestion, ASK_PROMPT);
        };

        /* ---------------------------- embed + retrieve --------------------------- */
        self.limiter.acquire().await;
        let context = match with_deadline("embed", self.stage_timeout, self.embedder.embed(question))
            .await
        {
            Ok(vector) => {
                debug!(dim = vector.len(), "question embedded");
                self.retriever.context(self.store.as_ref(), &vector).await
            }
            Err(f) => {
                warn!(kind = ?f.kind, detail = %f.detail, "embedding failed, skipping retrieval");
                String::new()
            }
        };

        if context.trim().is_empty() {
            let variant = fallback::classify(question);
            info!(?variant, "no context, answering from fallback");
            return PipelineReply::new(Outcome::Fallback, variant.text());
        }

        /* -------------------------------- generate ------------------------------- */
        self.limiter.acquire().await;
        let prompt = self.prompt.build(&context, question);
        let started = Instant::now();
        let generated =
            with_deadline("generate", self.stage_timeout, self.generator.generate(&prompt)).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match generated {
            Ok(text) if !text.trim().is_empty() => {
                info!(latency_ms, answer_chars = text.chars().count(), "answer generated");
                PipelineReply::new(Outcome::Answered, text)
            }
            Ok(_) => {
                warn!(latency_ms, "empty generation, answering from fallback");
                PipelineReply::new(Outcome::Fallback, fallback::respond(question))
            }
            Err(f) if f.kind == FailureKind::RateLimited => {
                warn!(latency_ms, detail = %f.detail, "generator quota exhausted");
                PipelineReply::new(Outcome::RateLimitNotice, RATE_LIMIT_NOTICE)
            }
            Err(f) => {
                warn!(latency_ms, kind = ?f.kind, detail = %f.detail, "generation failed, answering from fallback");
                PipelineReply::new(Outcome::Fallback, fallback::respond(question))
            }
        }
    }
}
