//! AI endpoint handlers

use axum::Extension;
use axum::Json;
use larder_ratelimit::RateLimitDecision;
use serde::Serialize;

use crate::extractors::Subject;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaResponse {
    pub allowed: bool,
    pub outcome: &'static str,
    pub failed_open: bool,
}

/// GET /api/v1/ai/quota
///
/// Preflight for AI-backed features; reaching the handler means the rate
/// limiter let the request through.
pub async fn quota(
    subject: Subject,
    Extension(decision): Extension<RateLimitDecision>,
) -> Json<QuotaResponse> {
    tracing::debug!(subject_id = %subject.0, outcome = decision.as_str(), "AI quota preflight");

    Json(QuotaResponse {
        allowed: decision.is_allowed(),
        outcome: decision.as_str(),
        failed_open: decision.is_failed_open(),
    })
}
