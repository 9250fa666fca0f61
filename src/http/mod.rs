//! Axum HTTP surface: the request-handling code that consumes the three
//! adapters.
//!
//! ## URL layout
//!
//! ```text
//! GET  /health   database probe through a scoped session
//! POST /chat     { "prompt": "..." } → { "reply": "..." }
//! ```

mod api;
pub mod cors;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Settings;
use crate::db::SessionProvider;
use crate::db::mysql::Engine;
use crate::error::AppError;
use crate::llm::ChatClient;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: SessionProvider<Engine>,
    pub chat: ChatClient,
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Serve until `shutdown` is cancelled, then finish in-flight requests.
pub async fn serve(state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let bind_addr = state.settings.server.bind.clone();
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .inspect_err(|e| error!(%bind_addr, error = %e, "http bind failed"))?;

    info!(%bind_addr, "http listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Http(format!("server error: {e}")))?;

    info!("http shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    let cors = cors::cors_layer(&state.settings.cors);
    Router::new()
        .route("/health", get(api::health))
        .route("/chat",   post(api::chat))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmBackend;
    use crate::llm::providers::scripted::ScriptedProvider;
    use crate::llm::LlmProvider;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_settings() -> Settings {
        let mut settings = Settings::test_default();
        settings.database.user = Some("app".into());
        settings.database.password = Some("pw".into());
        settings.database.host = Some("127.0.0.1".into());
        // Nothing listens here; probes fail fast or time out.
        settings.database.port = "1".into();
        settings.database.database = Some("ismart".into());
        settings.azure_openai.backend = LlmBackend::Dummy;
        settings
    }

    fn state_with(settings: Settings, chat: ChatClient) -> AppState {
        let engine = Engine::build(&settings.database).unwrap();
        AppState {
            settings: Arc::new(settings),
            sessions: SessionProvider::new(engine),
            chat,
        }
    }

    fn state(settings: Settings) -> AppState {
        let chat = ChatClient::build(&settings.azure_openai).unwrap();
        state_with(settings, chat)
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn chat_request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn serve_reports_bind_failure_as_io_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut settings = test_settings();
        settings.server.bind = taken.local_addr().unwrap().to_string();

        let result = serve(state(settings), CancellationToken::new()).await;
        assert!(matches!(result, Err(AppError::Io(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn serve_stops_when_cancelled() {
        let mut settings = test_settings();
        settings.server.bind = "127.0.0.1:0".into();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        assert!(serve(state(settings), shutdown).await.is_ok());
    }

    #[tokio::test]
    async fn chat_returns_reply() {
        let app = build_router(state(test_settings()));
        let resp = app.oneshot(chat_request(json!({ "prompt": "keywords for rust" }))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({ "reply": "[echo] keywords for rust" }));
    }

    #[tokio::test]
    async fn chat_failure_is_still_ok_with_sentinel() {
        let chat = ChatClient::new(LlmProvider::Scripted(ScriptedProvider::fail("HTTP 503: busy")));
        let app = build_router(state_with(test_settings(), chat));
        let resp = app.oneshot(chat_request(json!({ "prompt": "hi" }))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let reply = body_json(resp).await["reply"].as_str().unwrap().to_owned();
        assert!(reply.starts_with("[LLM Error]"));
        assert!(reply.contains("busy"));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected() {
        let app = build_router(state(test_settings()));
        let resp = app.oneshot(chat_request(json!({ "prompt": "   " }))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "empty_prompt");
    }

    #[tokio::test(start_paused = true)]
    async fn health_reports_unreachable_database() {
        let app = build_router(state(test_settings()));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "unavailable");
    }

    #[tokio::test]
    async fn preflight_mirrors_origin_with_credentials() {
        let app = build_router(state(test_settings()));
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let headers = resp.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn explicit_origin_list_is_enforced() {
        let mut settings = test_settings();
        settings.cors.allow_origins = "http://app.example.org".into();
        settings.cors.allow_credentials = false;
        let app = build_router(state(settings));

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat")
            .header(header::ORIGIN, "http://evil.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn wildcard_without_credentials_allows_any() {
        let mut settings = test_settings();
        settings.cors.allow_credentials = false;
        let app = build_router(state(settings));

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat")
            .header(header::ORIGIN, "http://anywhere.test")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
