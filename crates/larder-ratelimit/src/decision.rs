//! Rate limit decisions

use serde::Serialize;

/// Outcome of a rate limit check.
///
/// Infra failures never surface as errors; they become [`Self::FailedOpen`] or
/// [`Self::FailClosed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RateLimitDecision {
    /// Within quota (or a relaxed denial outside production)
    Allowed,
    /// Over quota
    Denied {
        /// Whole seconds until the window resets
        retry_after_secs: u64,
    },
    /// Limiter unreachable, request let through
    FailedOpen,
    /// Limiter unreachable for too long, request refused
    FailClosed,
}

impl RateLimitDecision {
    /// Whether the guarded request may proceed
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed | Self::FailedOpen)
    }

    /// Seconds to wait before retrying, for quota denials
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Denied { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Whether the breaker is refusing requests
    pub const fn is_fail_closed(&self) -> bool {
        matches!(self, Self::FailClosed)
    }

    /// Whether the request was let through without a limiter answer
    pub const fn is_failed_open(&self) -> bool {
        matches!(self, Self::FailedOpen)
    }

    /// Label for metrics
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied { .. } => "denied",
            Self::FailedOpen => "failed_open",
            Self::FailClosed => "fail_closed",
        }
    }
}
