//! Handlers for copy-job dispatch.
//!
//! Two entry points reach the same dispatcher: the versioned
//! `POST /skopeo-machine/v1/copy` and the legacy action envelope on `POST /`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use skopeo_machine_core::error::CoreError;

use crate::engine::dispatcher::DispatchOutcome;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::BasicAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /skopeo-machine/v1/copy`.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyJob {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
}

impl CopyJob {
    /// Strip surrounding whitespace from both references.
    pub fn trimmed(self) -> Self {
        Self {
            source: self.source.trim().to_string(),
            target: self.target.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.source.trim().is_empty() {
            return Err(CoreError::Validation("source is empty".into()));
        }
        if self.target.trim().is_empty() {
            return Err(CoreError::Validation("target is empty".into()));
        }
        Ok(())
    }
}

/// Body of the legacy `POST /`: `{ "action": "copy", "source": .., "target": .. }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: String,
    #[serde(flatten)]
    pub copy: CopyJob,
}

/// POST /skopeo-machine/v1/copy
///
/// Dispatch a copy job unless one is already running or recently completed
/// for the same (source, target) pair.
pub async fn copy(
    _auth: BasicAuth,
    State(state): State<AppState>,
    payload: Result<Json<CopyJob>, JsonRejection>,
) -> AppResult<Json<DataResponse<DispatchOutcome>>> {
    let Json(input) = payload?;
    dispatch(&state, input).await
}

/// POST /
///
/// Legacy action endpoint. Only `copy` is supported.
pub async fn legacy_action(
    _auth: BasicAuth,
    State(state): State<AppState>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<DispatchOutcome>>> {
    let Json(input) = payload?;
    match input.action.as_str() {
        "copy" => dispatch(&state, input.copy).await,
        other => {
            tracing::debug!(action = %other, "Unsupported action");
            Err(AppError::BadRequest("action not supported".into()))
        }
    }
}

async fn dispatch(
    state: &AppState,
    input: CopyJob,
) -> AppResult<Json<DataResponse<DispatchOutcome>>> {
    let input = input.trimmed();
    input.validate()?;

    let outcome = state
        .dispatcher
        .dispatch(&input.source, &input.target)
        .await?;

    Ok(Json(DataResponse { data: outcome }))
}
