/// Configuration for a single Gemini model invocation.
///
/// The same struct describes both the generation profile and the embedding
/// profile; fields that do not apply to a profile stay `None`.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmModelConfig;
///
/// let cfg = LlmModelConfig {
///     model: "gemini-1.5-flash".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: Some("AIza...".to_string()),
///     max_tokens: Some(500),
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.base_url(), "https://generativelanguage.googleapis.com");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier without the `models/` prefix (e.g., `"text-embedding-004"`).
    pub model: String,

    /// API base URL; paths like `/v1beta/models/...` are appended to it.
    pub endpoint: String,

    /// API key sent as `x-goog-api-key`.
    pub api_key: Option<String>,

    /// Maximum number of output tokens (`generationConfig.maxOutputTokens`).
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Endpoint without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }

    /// `{base}/v1beta/models/{model}`, the resource every Gemini call hangs off.
    pub fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url(), self.model)
    }
}
