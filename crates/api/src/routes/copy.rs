use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount the versioned copy route (nested under `/skopeo-machine/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/copy", post(handlers::copy::copy))
}

/// Mount the legacy action endpoint at the root.
pub fn legacy_router() -> Router<AppState> {
    Router::new().route("/", post(handlers::copy::legacy_action))
}
