//! Cron-triggered handlers

use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use larder_reminder_core::SweepReport;
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{record_op_duration, secrets_match};
use crate::state::AppState;

/// Header carrying the scheduler's shared secret
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// GET|POST /api/v1/cron/subscription-reminder
#[instrument(skip(state, headers))]
pub async fn subscription_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SweepReport>> {
    let presented = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !secrets_match(presented, &state.config.cron_secret) {
        tracing::warn!("Rejected cron request with invalid secret");
        return Err(ApiError::Unauthorized);
    }

    let start = Instant::now();
    let result = state.scheduler.sweep_due_reminders(Utc::now()).await;
    record_op_duration("sweep_due_reminders", start, result.is_ok());

    let report = result?;
    metrics::counter!("reminder_sweeps_total").increment(1);
    Ok(Json(report))
}
