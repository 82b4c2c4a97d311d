//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Pantry container repository trait
#[async_trait]
pub trait ContainerRepository: Send + Sync {
    /// Find a container owned by the given subject
    async fn find_for_subject(&self, id: Uuid, subject_id: Uuid)
        -> DbResult<Option<ContainerRow>>;

    /// Mark an active container as empty.
    ///
    /// Returns `false` when the container was already finished.
    async fn mark_finished(&self, id: Uuid, finished_at: DateTime<Utc>) -> DbResult<bool>;
}

/// Consumption sample repository trait
#[async_trait]
pub trait ConsumptionRepository: Send + Sync {
    /// Record a sample, replacing any earlier one for the same container
    async fn insert(&self, sample: CreateConsumptionSample) -> DbResult<ConsumptionSampleRow>;

    /// Most recent samples for a (subject, product) pair, newest `finished_at` first
    async fn find_recent(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<ConsumptionSampleRow>>;
}

/// Create consumption sample input
#[derive(Debug, Clone)]
pub struct CreateConsumptionSample {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub product_id: Uuid,
    pub container_id: Uuid,
    pub acquired_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_days: i32,
}

/// Reminder subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the subscription for a (subject, product) pair
    async fn find_by_subject_and_product(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
    ) -> DbResult<Option<SubscriptionRow>>;

    /// Apply a finish-event schedule update in a single-row write
    async fn update_schedule(&self, id: Uuid, update: ScheduleUpdate) -> DbResult<()>;

    /// Move the next reminder without touching the cycle
    async fn update_next_reminder(&self, id: Uuid, next_reminder_at: DateTime<Utc>)
        -> DbResult<()>;

    /// Active subscriptions whose reminder is due at `now`
    async fn find_due(&self, now: DateTime<Utc>) -> DbResult<Vec<SubscriptionRow>>;
}

/// Fields written after a container of a subscribed product is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub current_cycle_days: i32,
    pub last_finished_at: DateTime<Utc>,
    pub next_reminder_at: DateTime<Utc>,
}

/// Notification repository trait
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification for delivery
    async fn create(&self, notification: CreateNotification) -> DbResult<NotificationRow>;
}

/// Create notification input
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}
