//! Error types for the Reminder API service.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use larder_reminder_core::ReminderError;
use serde::Serialize;
use serde_json::json;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing or invalid subject")]
    Unauthenticated,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded")]
    RateLimited {
        retry_after_secs: Option<u64>,
        fail_closed: bool,
    },

    #[error("{0}")]
    Reminder(#[from] ReminderError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Reminder(e) => match e {
                ReminderError::Validation(_) => StatusCode::BAD_REQUEST,
                ReminderError::ContainerNotFound => StatusCode::NOT_FOUND,
                ReminderError::ContainerAlreadyFinished => StatusCode::CONFLICT,
                ReminderError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::RateLimited { fail_closed: true, .. } => "RATE_LIMITER_UNAVAILABLE",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Reminder(e) => match e {
                ReminderError::Validation(_) => "VALIDATION_ERROR",
                ReminderError::ContainerNotFound => "CONTAINER_NOT_FOUND",
                ReminderError::ContainerAlreadyFinished => "CONTAINER_ALREADY_FINISHED",
                ReminderError::Persistence(_) => "INTERNAL_ERROR",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Persistence details stay in the logs
        let message = match &self {
            Self::Reminder(ReminderError::Persistence(e)) => {
                tracing::error!(error = ?e, "Internal API error");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        let details = match &self {
            Self::RateLimited {
                retry_after_secs,
                fail_closed,
            } => Some(json!({
                "retryAfter": retry_after_secs,
                "failClosed": fail_closed,
            })),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use larder_db::DbError;

    #[test]
    fn test_reminder_errors_map_to_statuses() {
        let cases = [
            (ApiError::from(ReminderError::ContainerNotFound), StatusCode::NOT_FOUND),
            (
                ApiError::from(ReminderError::ContainerAlreadyFinished),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(ReminderError::Persistence(DbError::NotFound)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: Some(17),
            fail_closed: false,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "17");
    }

    #[test]
    fn test_fail_closed_has_no_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: None,
            fail_closed: true,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
