use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use contextor::{ChatPipeline, ContextorConfig, ContextorError, DEFAULT_MIN_INTERVAL, RateLimiter};
use rag_store::RagStore;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Everything a configured request needs.
pub struct Backend {
    pub profiles: Arc<LlmServiceProfiles>,
    pub store: Arc<RagStore>,
    pub pipeline: ChatPipeline,
}

impl Backend {
    pub fn new(
        profiles: Arc<LlmServiceProfiles>,
        store: Arc<RagStore>,
        limiter: Arc<RateLimiter>,
        cfg: &ContextorConfig,
    ) -> Self {
        let pipeline = ChatPipeline::from_services(profiles.clone(), store.clone(), limiter, cfg);
        Self {
            profiles,
            store,
            pipeline,
        }
    }

    /// Reads `GEMINI_*`, `ASTRA_DB_*` and pipeline knobs from the environment.
    pub fn from_env(limiter: Arc<RateLimiter>) -> Result<Self, ContextorError> {
        let cfg = ContextorConfig::from_env()?;
        let profiles = Arc::new(LlmServiceProfiles::from_env()?);
        let store = Arc::new(RagStore::from_env()?);
        Ok(Self::new(profiles, store, limiter, &cfg))
    }
}

type BackendLoader = dyn Fn(Arc<RateLimiter>) -> Result<Backend, ContextorError> + Send + Sync;

/// Shared state for all HTTP handlers.
///
/// The rate limiter lives here, not in the backend, so that one process-wide
/// call budget survives backend rebuilds.
pub struct AppState {
    limiter: Arc<RateLimiter>,
    backend: RwLock<Option<Arc<Backend>>>,
    loader: Box<BackendLoader>,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// Missing configuration is logged, not fatal: the server starts and every
    /// request retries the load until it succeeds.
    pub fn from_env() -> Self {
        let interval = match ContextorConfig::from_env() {
            Ok(cfg) => cfg.rate_limit_interval,
            Err(err) => {
                warn!(error = %err, "invalid pipeline config, using default rate limit interval");
                DEFAULT_MIN_INTERVAL
            }
        };
        let limiter = Arc::new(RateLimiter::new(interval));

        let backend = match Backend::from_env(limiter.clone()) {
            Ok(b) => {
                info!("chat backend configured");
                Some(Arc::new(b))
            }
            Err(err) => {
                error!(error = %err, "chat backend not configured; requests will fail until fixed");
                None
            }
        };

        Self {
            limiter,
            backend: RwLock::new(backend),
            loader: Box::new(Backend::from_env),
        }
    }

    /// State with a custom loader; nothing is loaded until the first request.
    pub fn with_loader<F>(limiter: Arc<RateLimiter>, loader: F) -> Self
    where
        F: Fn(Arc<RateLimiter>) -> Result<Backend, ContextorError> + Send + Sync + 'static,
    {
        Self {
            limiter,
            backend: RwLock::new(None),
            loader: Box::new(loader),
        }
    }

    /// State around an already built backend.
    pub fn with_backend(limiter: Arc<RateLimiter>, backend: Backend) -> Self {
        Self {
            limiter,
            backend: RwLock::new(Some(Arc::new(backend))),
            loader: Box::new(Backend::from_env),
        }
    }

    /// The configured backend, building it now if a previous attempt failed.
    pub async fn backend(&self) -> Option<Arc<Backend>> {
        if let Some(b) = self.backend.read().await.as_ref() {
            return Some(b.clone());
        }

        let mut slot = self.backend.write().await;
        if let Some(b) = slot.as_ref() {
            return Some(b.clone());
        }
        match (self.loader)(self.limiter.clone()) {
            Ok(b) => {
                info!("chat backend configured");
                let b = Arc::new(b);
                *slot = Some(b.clone());
                Some(b)
            }
            Err(err) => {
                warn!(error = %err, "chat backend still not configured");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_loading_on_every_request() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();
        let state = AppState::with_loader(Arc::new(RateLimiter::default()), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Err(ContextorError::Config("missing".into()))
        });

        assert!(state.backend().await.is_none());
        assert!(state.backend().await.is_none());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
