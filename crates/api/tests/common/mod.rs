#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use skopeo_machine_api::config::{AuthConfig, BackendKind, ServerConfig};
use skopeo_machine_api::engine::dispatcher::Dispatcher;
use skopeo_machine_api::router::build_app_router;
use skopeo_machine_api::state::AppState;
use skopeo_machine_cluster::InMemoryJobBackend;
use skopeo_machine_core::clock::ManualClock;
use skopeo_machine_core::settings::DispatchSettings;

pub const NAMESPACE: &str = "mirror";

/// Router plus handles on the fakes behind it.
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<InMemoryJobBackend>,
    pub clock: Arc<ManualClock>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        backend: BackendKind::Memory,
        config_path: PathBuf::from("config.json"),
    }
}

pub fn test_settings() -> DispatchSettings {
    let mut settings = DispatchSettings::default();
    settings.job.namespace = NAMESPACE.to_string();
    settings
}

/// Build the full application router over an in-memory backend and a
/// manual clock, with auth disabled.
pub fn build_test_app() -> TestApp {
    build_test_app_with(AuthConfig::default(), InMemoryJobBackend::new())
}

/// Same as [`build_test_app`] with basic auth enabled for `ops` / `hunter2`.
pub fn build_test_app_with_auth() -> TestApp {
    let auth = AuthConfig {
        username: "ops".to_string(),
        password: "hunter2".to_string(),
    };
    build_test_app_with(auth, InMemoryJobBackend::new())
}

pub fn build_test_app_with(auth: AuthConfig, backend: InMemoryJobBackend) -> TestApp {
    let config = test_config();
    let backend = Arc::new(backend);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap(),
    ));

    let dispatcher = Dispatcher::new(backend.clone(), clock.clone(), test_settings());
    let state = AppState {
        config: Arc::new(config.clone()),
        auth: Arc::new(auth),
        dispatcher: Arc::new(dispatcher),
    };

    TestApp {
        router: build_app_router(state, &config),
        backend,
        clock,
    }
}

/// Same as [`build_test_app`] but every backend call sleeps for `latency`.
pub fn build_slow_test_app(latency: Duration) -> TestApp {
    build_test_app_with(AuthConfig::default(), InMemoryJobBackend::with_latency(latency))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string(), None).await
}

pub async fn post_json_with_basic(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    username: &str,
    password: &str,
) -> Response<Body> {
    let credentials = general_purpose::STANDARD.encode(format!("{username}:{password}"));
    post_raw(
        app,
        uri,
        body.to_string(),
        Some(format!("Basic {credentials}")),
    )
    .await
}

/// POST an arbitrary body with `content-type: application/json`.
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: String,
    authorization: Option<String>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
