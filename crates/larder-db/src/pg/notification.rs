//! PostgreSQL notification repository implementation

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::NotificationRow;
use crate::repo::{CreateNotification, NotificationRepository};

/// PostgreSQL notification repository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new notification repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: CreateNotification) -> DbResult<NotificationRow> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (id, subject_id, kind, title, body, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, subject_id, kind, title, body, data, created_at, read_at
            "#,
        )
        .bind(notification.id)
        .bind(notification.subject_id)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(Json(&notification.data))
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
