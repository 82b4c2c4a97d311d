//! Consumption samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContainerId, DomainError, ProductId, SubjectId};

/// One observed acquire-to-finish interval for a container.
///
/// Samples are immutable and kept forever; the most recent few feed the
/// reorder-cycle estimate for a (subject, product) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionSample {
    /// Subject that consumed the container
    pub subject_id: SubjectId,
    /// Product the container holds
    pub product_id: ProductId,
    /// The container that ran out
    pub container_id: ContainerId,
    /// When the container was acquired
    pub acquired_at: DateTime<Utc>,
    /// When the container was finished
    pub finished_at: DateTime<Utc>,
}

impl ConsumptionSample {
    /// Create a sample, rejecting intervals shorter than one whole day.
    pub fn new(
        subject_id: SubjectId,
        product_id: ProductId,
        container_id: ContainerId,
        acquired_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if (finished_at - acquired_at).num_days() < 1 {
            return Err(DomainError::NonPositiveDuration {
                acquired_at,
                finished_at,
            });
        }

        Ok(Self {
            subject_id,
            product_id,
            container_id,
            acquired_at,
            finished_at,
        })
    }

    /// Whole days between acquisition and finish (truncated).
    pub fn duration_days(&self) -> i64 {
        (self.finished_at - self.acquired_at).num_days()
    }
}
