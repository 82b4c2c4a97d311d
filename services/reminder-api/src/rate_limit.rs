//! Rate limiting middleware for AI-backed routes.
//!
//! Consults the breaker once per request and stores the decision in the
//! request extensions for handlers that want to report it.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use larder_ratelimit::RateLimitDecision;

use crate::error::ApiError;
use crate::extractors::Subject;
use crate::state::AppState;

/// Reject the request with 429 unless the limiter lets it through
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    subject: Subject,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let decision = state.limiter.check(&subject.0).await;

    match decision {
        RateLimitDecision::Allowed | RateLimitDecision::FailedOpen => {
            request.extensions_mut().insert(decision);
            Ok(next.run(request).await)
        }
        RateLimitDecision::Denied { retry_after_secs } => Err(ApiError::RateLimited {
            retry_after_secs: Some(retry_after_secs),
            fail_closed: false,
        }),
        RateLimitDecision::FailClosed => Err(ApiError::RateLimited {
            retry_after_secs: None,
            fail_closed: true,
        }),
    }
}
