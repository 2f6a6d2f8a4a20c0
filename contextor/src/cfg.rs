//! Runtime configuration loaded from environment variables.

use std::time::Duration;

use crate::error::ContextorError;
use crate::prompt::DEFAULT_MAX_CTX_CHARS;
use crate::rate_limiter::DEFAULT_MIN_INTERVAL;
use crate::retriever::{DEFAULT_FALLBACK_LIMIT, DEFAULT_TOP_K};

/// Pipeline knobs. All fields have defaults; see [`ContextorConfig::from_lookup`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextorConfig {
    /// Minimum spacing between provider calls (`RATE_LIMIT_INTERVAL_MS`).
    pub rate_limit_interval: Duration,
    /// Ranked search size (`RAG_TOP_K`).
    pub top_k: usize,
    /// Unranked fallback size (`RAG_FALLBACK_LIMIT`).
    pub fallback_limit: usize,
    /// Context clamp (`MAX_CTX_CHARS`).
    pub max_ctx_chars: usize,
    /// Deadline for every external call (`STAGE_TIMEOUT_SECS`).
    pub stage_timeout: Duration,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            rate_limit_interval: DEFAULT_MIN_INTERVAL,
            top_k: DEFAULT_TOP_K,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
            max_ctx_chars: DEFAULT_MAX_CTX_CHARS,
            stage_timeout: Duration::from_secs(45),
        }
    }
}

impl ContextorConfig {
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// # Example
    /// ```
    /// use contextor::ContextorConfig;
    /// let cfg = ContextorConfig::from_lookup(|k| (k == "RAG_TOP_K").then(|| "8".to_string())).unwrap();
    /// assert_eq!(cfg.top_k, 8);
    /// assert_eq!(cfg.fallback_limit, 3);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContextorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let cfg = Self {
            rate_limit_interval: Duration::from_millis(parse(
                &lookup,
                "RATE_LIMIT_INTERVAL_MS",
                d.rate_limit_interval.as_millis() as u64,
            )?),
            top_k: parse(&lookup, "RAG_TOP_K", d.top_k)?,
            fallback_limit: parse(&lookup, "RAG_FALLBACK_LIMIT", d.fallback_limit)?,
            max_ctx_chars: parse(&lookup, "MAX_CTX_CHARS", d.max_ctx_chars)?,
            stage_timeout: Duration::from_secs(parse(
                &lookup,
                "STAGE_TIMEOUT_SECS",
                d.stage_timeout.as_secs(),
            )?),
        };

        if cfg.top_k == 0 || cfg.fallback_limit == 0 {
            return Err(ContextorError::Config(
                "RAG_TOP_K and RAG_FALLBACK_LIMIT must be > 0".into(),
            ));
        }
        if cfg.stage_timeout.is_zero() {
            return Err(ContextorError::Config("STAGE_TIMEOUT_SECS must be > 0".into()));
        }
        Ok(cfg)
    }
}

fn parse<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ContextorError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ContextorError::Config(format!("{name} has an invalid value: {v}"))),
    }
}
