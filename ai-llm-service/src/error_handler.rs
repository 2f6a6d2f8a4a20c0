//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums (e.g., [`ConfigError`],
//! [`ProviderError`], [`HealthError`]). Callers that only need to branch on the
//! failure category use [`AiLlmError::kind`] instead of matching on messages.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream provider rejected or mangled a request.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Health-check/connectivity/decoding errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Stable failure category for callers that must not depend on message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Quota exhausted or HTTP 429.
    RateLimited,
    /// Request did not finish in time.
    Timeout,
    /// Network-level failure (connect, TLS, body read).
    Transport,
    /// Provider answered, but not with something usable.
    Upstream,
    /// Local configuration is unusable.
    Config,
}

impl AiLlmError {
    /// Classifies the error into a [`LlmErrorKind`].
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            AiLlmError::Config(_) => LlmErrorKind::Config,
            AiLlmError::Timeout(_) => LlmErrorKind::Timeout,
            AiLlmError::HttpTransport(e) if e.is_timeout() => LlmErrorKind::Timeout,
            AiLlmError::HttpTransport(_) => LlmErrorKind::Transport,
            AiLlmError::Provider(p) => match &p.kind {
                ProviderErrorKind::QuotaExhausted(_) => LlmErrorKind::RateLimited,
                ProviderErrorKind::HttpStatus(h) if h.status == StatusCode::TOO_MANY_REQUESTS => {
                    LlmErrorKind::RateLimited
                }
                ProviderErrorKind::MissingApiKey | ProviderErrorKind::InvalidEndpoint(_) => {
                    LlmErrorKind::Config
                }
                _ => LlmErrorKind::Upstream,
            },
            AiLlmError::Health(_) => LlmErrorKind::Upstream,
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `GEMINI_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Upstream provider identity, kept for log attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("Gemini"),
        }
    }
}

/// Non-success HTTP exchange details.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL (without credentials).
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// What went wrong when talking to a provider.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Provider refused the call because the quota or rate limit is exhausted.
    #[error("quota exhausted ({0})")]
    QuotaExhausted(HttpError),

    #[error("{0}")]
    HttpStatus(HttpError),

    #[error("decode error: {0}")]
    Decode(String),

    /// Response contained no candidate text.
    #[error("no candidates returned")]
    EmptyCandidates,

    /// The prompt was blocked by provider safety filters.
    #[error("prompt blocked: {0}")]
    Blocked(String),
}

/// Provider error with attribution.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }

    /// Builds the right variant for a non-success response, separating quota
    /// exhaustion from other failures. `body` is the full response text.
    pub fn from_status(provider: Provider, status: StatusCode, url: String, body: &str) -> Self {
        let err = HttpError {
            status,
            url,
            snippet: make_snippet(body),
        };
        let kind = if is_quota_signal(status, body) {
            ProviderErrorKind::QuotaExhausted(err)
        } else {
            ProviderErrorKind::HttpStatus(err)
        };
        Self::new(provider, kind)
    }
}

/// Returns `true` when a response means "quota or rate limit exhausted".
///
/// Gemini answers 429 with `RESOURCE_EXHAUSTED`; some proxies answer 403/400
/// with a quota message instead, so the body is checked too.
pub fn is_quota_signal(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("resource_exhausted") || lower.contains("quota")
}

/// Trims a response body down to a log-friendly snippet.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 240;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let mut s: String = trimmed.chars().take(MAX).collect();
        s.push('…');
        s
    }
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for provider health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// The endpoint is empty or does not start with http/https.
    #[error("[AI LLM Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty variable through `lookup`.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_var<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Reads an optional variable; empty values count as unset.
pub fn opt_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u32` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if set but not a valid `u32`.
pub fn opt_u32<F>(lookup: &F, name: &'static str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    opt_var(lookup, name)
        .map(|v| {
            v.parse::<u32>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected u32",
                })
            })
        })
        .transpose()
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
pub fn opt_u64<F>(lookup: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    opt_var(lookup, name)
        .map(|v| {
            v.parse::<u64>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected u64",
                })
            })
        })
        .transpose()
}

/// Parses an optional `f32` (`Ok(None)` if unset/empty).
pub fn opt_f32<F>(lookup: &F, name: &'static str) -> Result<Option<f32>>
where
    F: Fn(&str) -> Option<String>,
{
    opt_var(lookup, name)
        .map(|v| {
            v.parse::<f32>().map_err(|_| {
                AiLlmError::from(ConfigError::InvalidNumber {
                    var: name,
                    reason: "expected f32",
                })
            })
        })
        .transpose()
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] otherwise.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://x/v1beta/models/m:generateContent";

    #[test]
    fn status_429_is_quota() {
        let err = ProviderError::from_status(
            Provider::Gemini,
            StatusCode::TOO_MANY_REQUESTS,
            URL.into(),
            "",
        );
        assert!(matches!(err.kind, ProviderErrorKind::QuotaExhausted(_)));
        assert_eq!(AiLlmError::from(err).kind(), LlmErrorKind::RateLimited);
    }

    #[test]
    fn quota_wording_in_body_is_quota() {
        let err = ProviderError::from_status(
            Provider::Gemini,
            StatusCode::FORBIDDEN,
            URL.into(),
            "You exceeded your current quota",
        );
        assert_eq!(AiLlmError::from(err).kind(), LlmErrorKind::RateLimited);
    }

    #[test]
    fn quota_marker_past_snippet_limit_still_counts() {
        let body = format!("{}RESOURCE_EXHAUSTED", "x".repeat(500));
        let err = ProviderError::from_status(Provider::Gemini, StatusCode::BAD_REQUEST, URL.into(), &body);
        assert_eq!(AiLlmError::from(err).kind(), LlmErrorKind::RateLimited);
    }

    #[test]
    fn server_error_is_upstream() {
        let err = ProviderError::from_status(
            Provider::Gemini,
            StatusCode::INTERNAL_SERVER_ERROR,
            URL.into(),
            "internal",
        );
        assert_eq!(AiLlmError::from(err).kind(), LlmErrorKind::Upstream);
    }

    #[test]
    fn timeout_kind() {
        let err = AiLlmError::Timeout(Duration::from_secs(3));
        assert_eq!(err.kind(), LlmErrorKind::Timeout);
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(1000);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), 241);
        assert!(s.ends_with('…'));
        assert_eq!(make_snippet("  short  "), "short");
    }

    #[test]
    fn env_helpers_use_lookup() {
        let lookup = |k: &str| match k {
            "A" => Some("  value ".to_string()),
            "EMPTY" => Some("   ".to_string()),
            "N" => Some("42".to_string()),
            "BAD" => Some("forty".to_string()),
            _ => None,
        };
        assert_eq!(must_var(&lookup, "A").unwrap(), "value");
        assert!(must_var(&lookup, "EMPTY").is_err());
        assert!(must_var(&lookup, "MISSING").is_err());
        assert_eq!(opt_u32(&lookup, "N").unwrap(), Some(42));
        assert_eq!(opt_u32(&lookup, "MISSING").unwrap(), None);
        assert!(opt_u32(&lookup, "BAD").is_err());
        assert_eq!(opt_f32(&lookup, "N").unwrap(), Some(42.0));
    }

    #[test]
    fn range_validation() {
        assert!(validate_range_f32("temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", 2.5, 0.0, 2.0).is_err());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 2.0).is_err());
    }

    #[test]
    fn endpoint_validation() {
        assert!(validate_http_endpoint("GEMINI_URL", "https://example.com").is_ok());
        assert!(validate_http_endpoint("GEMINI_URL", "example.com").is_err());
    }
}
