//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app();
    let response = get(app.router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["dispatcher"], "idle");
}

// ---------------------------------------------------------------------------
// Test: health stays open when basic auth is configured
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_does_not_require_auth() {
    let app = common::build_test_app_with_auth();
    let response = get(app.router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: health reports busy while a dispatch is in flight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_busy_dispatcher() {
    let app = common::build_slow_test_app(Duration::from_millis(200));

    let in_flight = tokio::spawn(post_json(
        app.router.clone(),
        "/skopeo-machine/v1/copy",
        json!({ "source": "alpine", "target": "mirror.local/alpine" }),
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let json = body_json(get(app.router.clone(), "/health").await).await;
    assert_eq!(json["dispatcher"], "busy");

    let response = in_flight.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app();
    let response = get(app.router, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app();
    let response = get(app.router, "/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: GET on a POST-only endpoint returns 405
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_on_copy_endpoint_returns_405() {
    let app = common::build_test_app();

    let response = get(app.router.clone(), "/skopeo-machine/v1/copy").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = get(app.router, "/").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
