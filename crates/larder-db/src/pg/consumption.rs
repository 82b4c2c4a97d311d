//! PostgreSQL consumption sample repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ConsumptionSampleRow;
use crate::repo::{ConsumptionRepository, CreateConsumptionSample};

/// PostgreSQL consumption sample repository
#[derive(Clone)]
pub struct PgConsumptionRepository {
    pool: PgPool,
}

impl PgConsumptionRepository {
    /// Create a new consumption sample repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsumptionRepository for PgConsumptionRepository {
    async fn insert(&self, sample: CreateConsumptionSample) -> DbResult<ConsumptionSampleRow> {
        let row = sqlx::query_as::<_, ConsumptionSampleRow>(
            r#"
            INSERT INTO consumption_samples (id, subject_id, product_id, container_id,
                                             acquired_at, finished_at, duration_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (container_id) DO UPDATE
            SET acquired_at = EXCLUDED.acquired_at,
                finished_at = EXCLUDED.finished_at,
                duration_days = EXCLUDED.duration_days
            RETURNING id, subject_id, product_id, container_id, acquired_at, finished_at,
                      duration_days, created_at
            "#,
        )
        .bind(sample.id)
        .bind(sample.subject_id)
        .bind(sample.product_id)
        .bind(sample.container_id)
        .bind(sample.acquired_at)
        .bind(sample.finished_at)
        .bind(sample.duration_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_recent(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<ConsumptionSampleRow>> {
        let samples = sqlx::query_as::<_, ConsumptionSampleRow>(
            r#"
            SELECT id, subject_id, product_id, container_id, acquired_at, finished_at,
                   duration_days, created_at
            FROM consumption_samples
            WHERE subject_id = $1 AND product_id = $2
            ORDER BY finished_at DESC
            LIMIT $3
            "#,
        )
        .bind(subject_id)
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }
}
