//! PostgreSQL pantry container repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ContainerRow;
use crate::repo::ContainerRepository;

/// PostgreSQL pantry container repository
#[derive(Clone)]
pub struct PgContainerRepository {
    pool: PgPool,
}

impl PgContainerRepository {
    /// Create a new container repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContainerRepository for PgContainerRepository {
    async fn find_for_subject(
        &self,
        id: Uuid,
        subject_id: Uuid,
    ) -> DbResult<Option<ContainerRow>> {
        let container = sqlx::query_as::<_, ContainerRow>(
            r#"
            SELECT id, subject_id, product_id, status, acquired_at, finished_at, created_at
            FROM pantry_containers
            WHERE id = $1 AND subject_id = $2
            "#,
        )
        .bind(id)
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(container)
    }

    async fn mark_finished(&self, id: Uuid, finished_at: DateTime<Utc>) -> DbResult<bool> {
        // Guarded on status so a container can only finish once
        let result = sqlx::query(
            r#"
            UPDATE pantry_containers
            SET status = 'empty', finished_at = $1
            WHERE id = $2 AND status = 'active'
            "#,
        )
        .bind(finished_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
