//! HTTP basic authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::{engine::general_purpose, Engine as _};
use skopeo_machine_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request passed the basic auth check.
///
/// When no credentials are configured every request passes. Use it as the
/// first extractor so auth is checked before the body is parsed:
///
/// ```ignore
/// async fn copy(_auth: BasicAuth, State(state): State<AppState>) -> AppResult<()> { .. }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BasicAuth;

impl FromRequestParts<AppState> for BasicAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.auth.is_enabled() {
            return Ok(BasicAuth);
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let (username, password) = parse_basic(header).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Basic <credentials>".into(),
            ))
        })?;

        if !state.auth.matches(&username, &password) {
            tracing::warn!(username = %username, "Rejected basic auth credentials");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            )));
        }

        Ok(BasicAuth)
    }
}

/// Decode `Basic <base64(username:password)>`. The scheme is case-insensitive.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
