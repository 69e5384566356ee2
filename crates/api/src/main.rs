use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skopeo_machine_api::config::{AppConfig, BackendKind, ServerConfig};
use skopeo_machine_api::engine::dispatcher::Dispatcher;
use skopeo_machine_api::router::build_app_router;
use skopeo_machine_api::state::AppState;
use skopeo_machine_cluster::{InMemoryJobBackend, KubeJobBackend};
use skopeo_machine_core::backend::JobBackend;
use skopeo_machine_core::clock::SystemClock;

const DEFAULT_LOG_FILTER: &str =
    "skopeo_machine_api=debug,skopeo_machine_cluster=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.backend,
        "Loaded server configuration",
    );

    let app_config = AppConfig::load(&config.config_path).expect("Failed to load config file");
    tracing::info!(
        path = %config.config_path.display(),
        namespace = %app_config.dispatch.job.namespace,
        image = %app_config.dispatch.job.image,
        auth = app_config.auth.is_enabled(),
        "Loaded dispatch configuration",
    );

    // --- Job backend ---
    let backend: Arc<dyn JobBackend> = match config.backend {
        BackendKind::Kube => Arc::new(
            KubeJobBackend::connect()
                .await
                .expect("Failed to create Kubernetes client"),
        ),
        BackendKind::Memory => {
            tracing::warn!("Using in-memory job backend, copy jobs will not run");
            Arc::new(InMemoryJobBackend::new())
        }
    };

    // --- App state ---
    let dispatcher = Dispatcher::new(backend, Arc::new(SystemClock), app_config.dispatch);
    let state = AppState {
        config: Arc::new(config.clone()),
        auth: Arc::new(app_config.auth),
        dispatcher: Arc::new(dispatcher),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` selects JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix); the latter is what
/// Kubernetes sends when the pod is stopped.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
