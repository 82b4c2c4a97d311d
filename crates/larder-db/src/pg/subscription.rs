//! PostgreSQL reminder subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::SubscriptionRow;
use crate::repo::{ScheduleUpdate, SubscriptionRepository};

/// PostgreSQL reminder subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_subject_and_product(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, subject_id, product_id, status, current_cycle_days,
                   last_finished_at, next_reminder_at, created_at, updated_at
            FROM reminder_subscriptions
            WHERE subject_id = $1 AND product_id = $2
            "#,
        )
        .bind(subject_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn update_schedule(&self, id: Uuid, update: ScheduleUpdate) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE reminder_subscriptions
            SET current_cycle_days = $1, last_finished_at = $2, next_reminder_at = $3,
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(update.current_cycle_days)
        .bind(update.last_finished_at)
        .bind(update.next_reminder_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn update_next_reminder(
        &self,
        id: Uuid,
        next_reminder_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE reminder_subscriptions SET next_reminder_at = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(next_reminder_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, subject_id, product_id, status, current_cycle_days,
                   last_finished_at, next_reminder_at, created_at, updated_at
            FROM reminder_subscriptions
            WHERE status = 'active' AND next_reminder_at <= $1
            ORDER BY next_reminder_at
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }
}
