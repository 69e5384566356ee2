use std::sync::Arc;

use crate::config::{AuthConfig, ServerConfig};
use crate::engine::dispatcher::Dispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Basic auth credentials for the copy endpoints.
    pub auth: Arc<AuthConfig>,
    /// The single copy-job dispatcher shared by every request.
    pub dispatcher: Arc<Dispatcher>,
}
