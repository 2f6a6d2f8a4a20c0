//! GET /api/health: probes Gemini models and samples the vector store.

use std::{sync::Arc, time::Instant};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rag_store::{Document, RagStore};
use tracing::{info, instrument, warn};

use crate::{
    core::app_state::AppState,
    routes::health::health_response::{HealthResponse, StoreHealth},
};

/// 200 with per-probe `ok` flags, or 503 while the backend is unconfigured.
#[instrument(name = "health_route", skip_all)]
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let Some(backend) = state.backend().await else {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse::unconfigured())).into_response();
    };

    let (models, store) = tokio::join!(backend.profiles.health_all(), probe_store(&backend.store));
    let ok = store.ok && models.iter().all(|m| m.ok);
    info!(ok, models = models.len(), store_ok = store.ok, "health_route: done");

    let body = HealthResponse {
        configured: true,
        ok,
        models,
        vector_store: Some(store),
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn probe_store(store: &RagStore) -> StoreHealth {
    let started = Instant::now();
    let sample = store.sample_document().await;
    let latency_ms = started.elapsed().as_millis() as u64;
    let collection = store.config().collection.clone();

    match sample {
        Ok(doc) => StoreHealth {
            collection,
            ok: true,
            latency_ms,
            fields: doc.as_ref().map(Document::fields).unwrap_or_default(),
            message: None,
        },
        Err(err) => {
            warn!(error = %err, "vector store probe failed");
            StoreHealth {
                collection,
                ok: false,
                latency_ms,
                fields: Vec::new(),
                message: Some(err.to_string()),
            }
        }
    }
}
