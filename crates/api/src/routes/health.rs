use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// `busy` while a dispatch holds the engine lock, otherwise `idle`.
    pub dispatcher: &'static str,
}

/// GET /health -- returns service health. Never requires auth.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let dispatcher = if state.dispatcher.is_busy() {
        "busy"
    } else {
        "idle"
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        dispatcher,
    })
}

/// Mount health check routes (root level).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
