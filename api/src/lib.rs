use std::{env, sync::Arc};

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::{AppState, Backend};
pub use crate::error_handler::{AppError, AppResult};

use crate::routes::{chat::chat_route::chat_route, health::health_route::health_route};

pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:3000";

/// Routes of the chat service over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_route))
        .route("/api/health", get(health_route))
        .with_state(state)
}

/// Binds `API_ADDRESS` (default [`DEFAULT_API_ADDRESS`]) and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let address = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());
    let state = Arc::new(AppState::from_env());

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| AppError::Bind {
            address: address.clone(),
            source,
        })?;
    info!(%address, "api listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            // Without a signal handler the server just runs until killed.
            error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmServiceProfiles};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use contextor::{
        ContextorConfig, ContextorError, RateLimiter,
        fallback::{ASK_PROMPT, BIOGRAPHY, SERVER_ERROR},
    };
    use rag_store::{RagConfig, RagStore};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model(server: &MockServer, name: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: name.to_string(),
            endpoint: server.uri(),
            api_key: Some("test-key".into()),
            max_tokens: Some(500),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    fn configured(server: &MockServer) -> Arc<AppState> {
        let limiter = Arc::new(RateLimiter::new(Duration::ZERO));
        let profiles = LlmServiceProfiles::new(
            model(server, "gemini-1.5-flash"),
            model(server, "text-embedding-004"),
            Some(2),
        )
        .unwrap();
        let store =
            RagStore::new(RagConfig::new(server.uri(), "tok", "ks", "portfolio")).unwrap();
        let backend = Backend::new(
            Arc::new(profiles),
            Arc::new(store),
            limiter.clone(),
            &ContextorConfig::default(),
        );
        Arc::new(AppState::with_backend(limiter, backend))
    }

    fn unconfigured() -> Arc<AppState> {
        Arc::new(AppState::with_loader(
            Arc::new(RateLimiter::default()),
            |_| Err(ContextorError::Config("GEMINI_API_KEY missing".into())),
        ))
    }

    async fn call(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
        let resp = build_router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn chat(body: &str) -> Request<Body> {
        Request::post("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn mount_embed(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1beta/models/text-embedding-004:embedContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embedding": {"values": [0.1, 0.2, 0.3]}})),
            )
            .mount(server)
            .await;
    }

    async fn mount_find(server: &MockServer, documents: Value) {
        Mock::given(method("POST"))
            .and(path("/api/json/v1/ks/portfolio"))
            .and(body_partial_json(json!({"find": {"options": {"limit": 5}}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"documents": documents}})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn answers_with_generated_text() {
        let server = MockServer::start().await;
        mount_embed(&server).await;
        mount_find(&server, json!([{"_id": "1", "text": "Prince built a RAG chatbot."}])).await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "He built a RAG chatbot."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = call(
            configured(&server),
            chat(r#"{"messages":[{"role":"user","content":"What did Prince build?"}]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "He built a RAG chatbot.");
        assert_eq!(body["role"], "assistant");
        assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn quota_exhaustion_is_still_200() {
        let server = MockServer::start().await;
        mount_embed(&server).await;
        mount_find(&server, json!([{"text": "bio"}])).await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"status": "RESOURCE_EXHAUSTED", "message": "quota"}
            })))
            .mount(&server)
            .await;

        let (status, body) = call(
            configured(&server),
            chat(r#"{"messages":[{"role":"user","content":"projects?"}]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["content"].as_str().unwrap().contains("high demand"));
    }

    #[tokio::test]
    async fn empty_store_gives_biography_fallback() {
        let server = MockServer::start().await;
        mount_embed(&server).await;
        mount_find(&server, json!([])).await;

        let (status, body) = call(
            configured(&server),
            chat(r#"{"messages":[{"role":"user","content":"Tell me about Prince"}]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], BIOGRAPHY);
    }

    #[tokio::test]
    async fn missing_question_asks_for_one() {
        let server = MockServer::start().await;
        let (status, body) = call(configured(&server), chat(r#"{"messages":[]}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], ASK_PROMPT);
    }

    #[tokio::test]
    async fn null_messages_asks_for_a_question() {
        let server = MockServer::start().await;
        let (status, body) = call(configured(&server), chat(r#"{"messages":null}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], ASK_PROMPT);
    }

    #[tokio::test]
    async fn malformed_json_is_400_with_answer_shape() {
        let server = MockServer::start().await;
        let (status, body) = call(configured(&server), chat("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["role"], "assistant");
        assert_eq!(body["content"], ASK_PROMPT);
    }

    #[tokio::test]
    async fn unconfigured_chat_is_500() {
        let (status, body) = call(
            unconfigured(),
            chat(r#"{"messages":[{"role":"user","content":"hi"}]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["content"], SERVER_ERROR);
    }

    #[tokio::test]
    async fn unconfigured_health_is_503() {
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, body) = call(unconfigured(), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["configured"], false);
    }

    #[tokio::test]
    async fn health_reports_models_and_store_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1beta/models/[^:]+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "m"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/json/v1/ks/portfolio"))
            .and(body_partial_json(json!({"findOne": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"document": {"_id": "1", "text": "bio"}}
            })))
            .mount(&server)
            .await;

        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, body) = call(configured(&server), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["models"].as_array().unwrap().len(), 2);
        assert_eq!(body["vector_store"]["fields"], json!(["_id", "text"]));
    }
}
