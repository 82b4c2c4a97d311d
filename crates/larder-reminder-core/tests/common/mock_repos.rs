//! Mock repositories for testing

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use larder_db::{
    ConsumptionRepository, ConsumptionSampleRow, ContainerRepository, ContainerRow,
    CreateConsumptionSample, CreateNotification, DbError, DbResult, NotificationRepository,
    NotificationRow, ScheduleUpdate, SubscriptionRepository, SubscriptionRow,
};
use sqlx::types::Json;
use uuid::Uuid;

fn injected() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// In-memory container repository for testing
#[derive(Default, Clone)]
pub struct MockContainerRepository {
    containers: Arc<DashMap<Uuid, ContainerRow>>,
}

impl MockContainerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an active container
    pub fn insert_active(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
        acquired_at: DateTime<Utc>,
    ) -> Uuid {
        let row = ContainerRow {
            id: Uuid::new_v4(),
            subject_id,
            product_id,
            status: "active".to_string(),
            acquired_at,
            finished_at: None,
            created_at: acquired_at,
        };
        let id = row.id;
        self.containers.insert(id, row);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<ContainerRow> {
        self.containers.get(&id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl ContainerRepository for MockContainerRepository {
    async fn find_for_subject(&self, id: Uuid, subject_id: Uuid) -> DbResult<Option<ContainerRow>> {
        Ok(self
            .containers
            .get(&id)
            .filter(|r| r.subject_id == subject_id)
            .map(|r| r.value().clone()))
    }

    async fn mark_finished(&self, id: Uuid, finished_at: DateTime<Utc>) -> DbResult<bool> {
        match self.containers.get_mut(&id) {
            Some(mut row) if row.status == "active" => {
                row.status = "empty".to_string();
                row.finished_at = Some(finished_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory consumption sample repository for testing
#[derive(Default, Clone)]
pub struct MockConsumptionRepository {
    samples: Arc<DashMap<Uuid, ConsumptionSampleRow>>,
    fail_inserts: Arc<AtomicBool>,
}

impl MockConsumptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a historical sample lasting `days`
    pub fn insert_sample(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
        finished_at: DateTime<Utc>,
        days: i64,
    ) {
        let row = ConsumptionSampleRow {
            id: Uuid::new_v4(),
            subject_id,
            product_id,
            container_id: Uuid::new_v4(),
            acquired_at: finished_at - Duration::days(days),
            finished_at,
            duration_days: i32::try_from(days).unwrap(),
            created_at: finished_at,
        };
        self.samples.insert(row.id, row);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

#[async_trait]
impl ConsumptionRepository for MockConsumptionRepository {
    async fn insert(&self, sample: CreateConsumptionSample) -> DbResult<ConsumptionSampleRow> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(injected());
        }

        let row = ConsumptionSampleRow {
            id: sample.id,
            subject_id: sample.subject_id,
            product_id: sample.product_id,
            container_id: sample.container_id,
            acquired_at: sample.acquired_at,
            finished_at: sample.finished_at,
            duration_days: sample.duration_days,
            created_at: Utc::now(),
        };
        // One sample per container, like the unique index
        self.samples.retain(|_, r| r.container_id != row.container_id);
        self.samples.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_recent(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<ConsumptionSampleRow>> {
        let mut rows: Vec<ConsumptionSampleRow> = self
            .samples
            .iter()
            .filter(|r| r.subject_id == subject_id && r.product_id == product_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}

/// In-memory subscription repository for testing
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subscriptions: Arc<DashMap<Uuid, SubscriptionRow>>,
    fail_updates: Arc<AtomicBool>,
    fail_queries: Arc<AtomicBool>,
    fail_reschedule: Arc<DashMap<Uuid, ()>>,
    schedule_updates: Arc<AtomicUsize>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a test subscription row
    pub fn create_test_subscription(
        subject_id: Uuid,
        product_id: Uuid,
        status: &str,
        cycle_days: i32,
        next_reminder_at: DateTime<Utc>,
    ) -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            subject_id,
            product_id,
            status: status.to_string(),
            current_cycle_days: cycle_days,
            last_finished_at: None,
            next_reminder_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn insert_subscription(&self, row: SubscriptionRow) -> Uuid {
        let id = row.id;
        self.subscriptions.insert(id, row);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<SubscriptionRow> {
        self.subscriptions.get(&id).map(|r| r.value().clone())
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Number of `update_schedule` calls, failed ones included
    pub fn schedule_updates(&self) -> usize {
        self.schedule_updates.load(Ordering::SeqCst)
    }

    /// Make `update_next_reminder` fail for one subscription
    pub fn fail_reschedule_of(&self, id: Uuid) {
        self.fail_reschedule.insert(id, ());
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_subject_and_product(
        &self,
        subject_id: Uuid,
        product_id: Uuid,
    ) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .subscriptions
            .iter()
            .find(|r| r.subject_id == subject_id && r.product_id == product_id)
            .map(|r| r.value().clone()))
    }

    async fn update_schedule(&self, id: Uuid, update: ScheduleUpdate) -> DbResult<()> {
        self.schedule_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(injected());
        }

        let mut row = self.subscriptions.get_mut(&id).ok_or(DbError::NotFound)?;
        row.current_cycle_days = update.current_cycle_days;
        row.last_finished_at = Some(update.last_finished_at);
        row.next_reminder_at = update.next_reminder_at;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn update_next_reminder(&self, id: Uuid, next_reminder_at: DateTime<Utc>) -> DbResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) || self.fail_reschedule.contains_key(&id) {
            return Err(injected());
        }

        let mut row = self.subscriptions.get_mut(&id).ok_or(DbError::NotFound)?;
        row.next_reminder_at = next_reminder_at;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> DbResult<Vec<SubscriptionRow>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(injected());
        }

        let mut rows: Vec<SubscriptionRow> = self
            .subscriptions
            .iter()
            .filter(|r| r.status == "active" && r.next_reminder_at <= now)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.next_reminder_at.cmp(&b.next_reminder_at));
        Ok(rows)
    }
}

/// In-memory notification repository for testing
#[derive(Default, Clone)]
pub struct MockNotificationRepository {
    notifications: Arc<DashMap<Uuid, NotificationRow>>,
    fail_subjects: Arc<DashMap<Uuid, ()>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make notification inserts fail for one subject
    pub fn fail_for_subject(&self, subject_id: Uuid) {
        self.fail_subjects.insert(subject_id, ());
    }

    pub fn all(&self) -> Vec<NotificationRow> {
        self.notifications.iter().map(|r| r.value().clone()).collect()
    }

    pub fn count_for_subject(&self, subject_id: Uuid) -> usize {
        self.notifications
            .iter()
            .filter(|r| r.subject_id == subject_id)
            .count()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn create(&self, notification: CreateNotification) -> DbResult<NotificationRow> {
        if self.fail_subjects.contains_key(&notification.subject_id) {
            return Err(injected());
        }

        let row = NotificationRow {
            id: notification.id,
            subject_id: notification.subject_id,
            kind: notification.kind,
            title: notification.title,
            body: notification.body,
            data: Json(notification.data),
            created_at: Utc::now(),
            read_at: None,
        };
        self.notifications.insert(row.id, row.clone());
        Ok(row)
    }
}
