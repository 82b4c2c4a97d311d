//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use larder_ratelimit::BreakerSnapshot;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub rate_limiter: RateLimiterStatus,
}

#[derive(Serialize)]
pub struct RateLimiterStatus {
    pub backend: &'static str,
    #[serde(flatten)]
    pub breaker: BreakerSnapshot,
}

/// Liveness probe - always returns OK if the service is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - checks database connectivity and reports the rate limiter breaker.
///
/// A fail-closed breaker is reported but does not fail readiness; only the AI
/// endpoints depend on it.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, (StatusCode, Json<ReadyResponse>)> {
    let rate_limiter = RateLimiterStatus {
        backend: state.limiter.backend_name(),
        breaker: state.limiter.snapshot(),
    };

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Ok(Json(ReadyResponse {
            status: "ready",
            database: "connected",
            rate_limiter,
        })),
        Err(e) => {
            tracing::error!(error = ?e, "Database health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "not_ready",
                    database: "disconnected",
                    rate_limiter,
                }),
            ))
        }
    }
}
