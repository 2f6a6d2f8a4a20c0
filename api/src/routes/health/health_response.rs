use ai_llm_service::HealthStatus;
use serde::Serialize;

/// Response payload for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `false` until the backend can be built from the environment.
    pub configured: bool,
    /// `true` when every probe below succeeded.
    pub ok: bool,
    pub models: Vec<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_store: Option<StoreHealth>,
}

/// Result of sampling one document from the collection.
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub collection: String,
    pub ok: bool,
    pub latency_ms: u64,
    /// Field names of the sampled document; empty for an empty collection.
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ok: false,
            models: Vec::new(),
            vector_store: None,
        }
    }
}
