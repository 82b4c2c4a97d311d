//! Common error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while constructing or parsing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A container must last at least one whole day
    #[error("finished_at ({finished_at}) must be at least one day after acquired_at ({acquired_at})")]
    NonPositiveDuration {
        /// When the container was acquired
        acquired_at: DateTime<Utc>,
        /// When the container was reported finished
        finished_at: DateTime<Utc>,
    },

    /// Unknown subscription status
    #[error("unknown subscription status: {0}")]
    UnknownSubscriptionStatus(String),

    /// Unknown container status
    #[error("unknown container status: {0}")]
    UnknownContainerStatus(String),

    /// The next reminder would fall outside the representable date range
    #[error("next reminder {cycle_days} days after {from} is out of range")]
    ScheduleOutOfRange {
        /// Start of the cycle
        from: DateTime<Utc>,
        /// Cycle length in days
        cycle_days: u32,
    },

    /// Reorder cycle must be at least one day
    #[error("invalid cycle length: {0} days")]
    InvalidCycle(i64),
}
