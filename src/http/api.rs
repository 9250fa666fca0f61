//! Axum handlers.
//!
//! Each handler receives [`AppState`] via [`axum::extract::State`] and
//! returns an axum [`Response`].

use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::AppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatRequest {
    prompt: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /health: runs `SELECT 1` inside a request-scoped session.
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let mut session = state.sessions.acquire();
    let probe = async {
        let conn = session.connection().await?;
        sqlx::query("SELECT 1").execute(conn).await?;
        Ok::<_, sqlx::Error>(())
    };

    let database = match tokio::time::timeout(DB_PROBE_TIMEOUT, probe).await {
        Ok(Ok(())) => "ok",
        Ok(Err(e)) => {
            warn!(error = %e, "database probe failed");
            "unavailable"
        }
        Err(_) => {
            warn!("database probe timed out");
            "unavailable"
        }
    };

    let status = if database == "ok" { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "status": if database == "ok" { "ok" } else { "degraded" },
        "database": database,
        "contact": state.settings.contact_email,
    });
    (status, Json(body)).into_response()
}

/// POST /chat: always 200 once the prompt is accepted; LLM failures come
/// back as sentinel replies.
pub(super) async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.prompt.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("empty_prompt", "prompt must not be empty")).into_response();
    }
    let reply = state.chat.chat(&req.prompt).await;
    Json(json!({ "reply": reply })).into_response()
}
