//! Plain HTTP surface: liveness probe and the single-instance activate hook.

use axum::{extract::State, http::StatusCode, Json};
use cronkite_core::config::AuthMode;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;

/// GET /health — liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "cronkite",
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": cronkite_core::config::PROTOCOL_VERSION,
        "jobs": state.registry.count(),
        "scheduler_running": state.scheduler.is_running(),
        "inflight": state.executor.inflight_count(),
    }))
}

/// POST /activate — broadcast `app.activate` to every connected client.
///
/// A second gateway launch calls this when it finds the port taken; UIs react
/// by raising their window. Body: `{ "token": "..." }` when token auth is on.
pub async fn activate_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    if state.config.gateway.auth.mode == AuthMode::Token {
        let presented = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("token").and_then(|t| t.as_str()).map(String::from));
        // Token mode with no token configured authenticates nobody, same as
        // the WS handshake.
        let expected = state.config.gateway.auth.token.as_deref();
        if expected.is_none() || presented.as_deref() != expected {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid token" })),
            );
        }
    }

    info!("activate requested");
    state.broadcast_activate();
    (StatusCode::OK, Json(json!({ "ok": true })))
}
