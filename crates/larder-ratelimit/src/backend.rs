//! Limiter backend abstraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Answer from a limiter backend that was reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitResponse {
    /// Whether the request fits in the subject's quota
    pub success: bool,
    /// When the current window resets
    pub reset_at: DateTime<Utc>,
}

impl LimitResponse {
    /// Request allowed
    pub fn allowed(reset_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            reset_at,
        }
    }

    /// Request over quota
    pub fn denied(reset_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            reset_at,
        }
    }
}

/// Limiter infrastructure failure.
///
/// These never reach callers of the breaker; they only drive its state.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport failure (connect, timeout, TLS, body read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Backend reported an error in the response payload
    #[error("backend error: {0}")]
    Remote(String),

    /// Response payload could not be understood
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A sliding-window limiter keyed by subject
#[async_trait]
pub trait LimiterBackend: Send + Sync {
    /// Consume one request for `key` at `now`
    async fn limit(&self, key: &str, now: DateTime<Utc>) -> Result<LimitResponse, BackendError>;

    /// Backend name for logs and metrics
    fn name(&self) -> &'static str;
}
