pub mod copy;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/skopeo-machine/v1` route tree.
///
/// ```text
/// /copy    POST   dispatch a copy job (basic auth when configured)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(copy::router())
}
