//! Default Gemini configs loaded from environment variables.
//!
//! Two roles are supported:
//!
//! - **Generation** → answers chat questions (`generateContent`)
//! - **Embedding**  → turns questions and chunks into vectors (`embedContent`)
//!
//! Every constructor has a `*_from_lookup` twin that reads variables through a
//! closure instead of the process environment, so tests never touch global state.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY`   = API key (mandatory)
//! - `GEMINI_URL`       = API base (default `https://generativelanguage.googleapis.com`)
//! - `GEMINI_MODEL`     = generation model (default `gemini-1.5-flash`)
//! - `EMBEDDING_MODEL`  = embedding model (default `text-embedding-004`)
//! - `LLM_MAX_TOKENS`   = max output tokens (default `500`)
//! - `LLM_TEMPERATURE`  = sampling temperature in `0..=2` (default `0.7`)
//! - `LLM_TIMEOUT_SECS` = per-request timeout (default `60`)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{
        ConfigError, Result, must_var, opt_f32, opt_u32, opt_u64, opt_var,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolves the endpoint and key shared by both roles.
fn gemini_base<F>(lookup: &F) -> Result<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = must_var(lookup, "GEMINI_API_KEY")?;
    let endpoint = opt_var(lookup, "GEMINI_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.into());
    validate_http_endpoint("GEMINI_URL", &endpoint)?;
    Ok((endpoint, api_key))
}

/// Constructs the **generation** config from the process environment.
pub fn config_gemini_generation() -> Result<LlmModelConfig> {
    config_gemini_generation_from_lookup(process_env)
}

/// Constructs the **generation** config through `lookup`.
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `GEMINI_API_KEY` is absent
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for bad numbers
pub fn config_gemini_generation_from_lookup<F>(lookup: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (endpoint, api_key) = gemini_base(&lookup)?;
    let model =
        opt_var(&lookup, "GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GENERATION_MODEL.into());
    let max_tokens = opt_u32(&lookup, "LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(ConfigError::OutOfRange {
            field: "max_tokens",
            detail: "must be greater than zero",
        }
        .into());
    }
    let temperature = opt_f32(&lookup, "LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;
    let timeout_secs = opt_u64(&lookup, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(LlmModelConfig {
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(max_tokens),
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the **embedding** config from the process environment.
pub fn config_gemini_embedding() -> Result<LlmModelConfig> {
    config_gemini_embedding_from_lookup(process_env)
}

/// Constructs the **embedding** config through `lookup`.
///
/// # Defaults
/// - `max_tokens = None`, `temperature = None` (not used by `embedContent`)
/// - `timeout_secs = 30`
pub fn config_gemini_embedding_from_lookup<F>(lookup: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (endpoint, api_key) = gemini_base(&lookup)?;
    let model =
        opt_var(&lookup, "EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into());

    Ok(LlmModelConfig {
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(30),
    })
}
