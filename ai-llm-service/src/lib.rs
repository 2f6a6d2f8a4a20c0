//! Shared Gemini service used by the chat pipeline and the ingestion tool.
//!
//! - [`config`]: model configs resolved from environment variables.
//! - [`services::gemini_service`]: thin REST client for `embedContent` and `generateContent`.
//! - [`service_profiles`]: the two logical profiles (`generation`, `embedding`) behind one handle.
//! - [`health_service`]: model availability probes for `/api/health`.
//! - [`telemetry`]: `tracing-subscriber` setup shared by all binaries.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, LlmErrorKind, Result};
pub use health_service::HealthStatus;
pub use service_profiles::LlmServiceProfiles;
