//! Pantry container handlers

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use larder_reminder_core::FinishOutcome;
use larder_types::ContainerId;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extractors::Subject;
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishContainerRequest {
    pub container_id: Uuid,
    /// Defaults to the time of the request
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishContainerResponse {
    pub container_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub reminder: FinishOutcome,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/pantry/finish
#[instrument(skip(state, payload), fields(subject_id = %subject.0))]
pub async fn finish_container(
    State(state): State<AppState>,
    subject: Subject,
    payload: Result<Json<FinishContainerRequest>, JsonRejection>,
) -> ApiResult<Json<FinishContainerResponse>> {
    let start = Instant::now();
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let finished_at = req.finished_at.unwrap_or_else(Utc::now);

    let result = state
        .scheduler
        .finish_container(subject.0, ContainerId(req.container_id), finished_at)
        .await;
    record_op_duration("finish_container", start, result.is_ok());

    Ok(Json(FinishContainerResponse {
        container_id: req.container_id,
        finished_at,
        reminder: result?,
    }))
}
