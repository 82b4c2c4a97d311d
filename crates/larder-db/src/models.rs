//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use larder_types::{
    ConsumptionSample, Container, ContainerId, DomainError, ProductId,
    ReminderSubscription, SubjectId, SubscriptionId,
};

/// Pantry container row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ContainerRow {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub product_id: Uuid,
    pub status: String,
    pub acquired_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Consumption sample row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ConsumptionSampleRow {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub product_id: Uuid,
    pub container_id: Uuid,
    pub acquired_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
}

/// Reminder subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub product_id: Uuid,
    pub status: String,
    pub current_cycle_days: i32,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub next_reminder_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Notification row from the database
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

// Conversion implementations from Row types to larder-types domain types

impl TryFrom<ContainerRow> for Container {
    type Error = DomainError;

    fn try_from(row: ContainerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContainerId(row.id),
            subject_id: SubjectId(row.subject_id),
            product_id: ProductId(row.product_id),
            status: row.status.parse()?,
            acquired_at: row.acquired_at,
            finished_at: row.finished_at,
        })
    }
}

impl TryFrom<ConsumptionSampleRow> for ConsumptionSample {
    type Error = DomainError;

    fn try_from(row: ConsumptionSampleRow) -> Result<Self, Self::Error> {
        ConsumptionSample::new(
            SubjectId(row.subject_id),
            ProductId(row.product_id),
            ContainerId(row.container_id),
            row.acquired_at,
            row.finished_at,
        )
    }
}

impl TryFrom<SubscriptionRow> for ReminderSubscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let current_cycle_days = u32::try_from(row.current_cycle_days)
            .ok()
            .filter(|days| *days > 0)
            .ok_or(DomainError::InvalidCycle(i64::from(row.current_cycle_days)))?;

        Ok(Self {
            id: SubscriptionId(row.id),
            subject_id: SubjectId(row.subject_id),
            product_id: ProductId(row.product_id),
            status: row.status.parse()?,
            current_cycle_days,
            last_finished_at: row.last_finished_at,
            next_reminder_at: row.next_reminder_at,
        })
    }
}
