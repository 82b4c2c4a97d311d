//! Reminder scheduling
//!
//! Two entry points: a finish event recomputes a subscription's cycle and due
//! date, and a sweep emits reminders for every due subscription.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use larder_db::{
    ConsumptionRepository, ContainerRepository, CreateConsumptionSample, CreateNotification,
    DbError, NotificationRepository, Repositories, ScheduleUpdate, SubscriptionRepository,
};
use larder_types::{
    reminder_after, ConsumptionSample, Container, ContainerId, DomainError, NewNotification,
    ProductId, ReminderSubscription, SubjectId, SubscriptionId,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::ReminderConfig;
use crate::cycle::estimate_cycle;
use crate::error::ReminderError;

/// Storage collaborators used by the scheduler
#[derive(Clone)]
pub struct ReminderStores {
    pub containers: Arc<dyn ContainerRepository>,
    pub samples: Arc<dyn ConsumptionRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl ReminderStores {
    /// Use the PostgreSQL repositories
    pub fn from_repositories(repos: Repositories) -> Self {
        Self {
            containers: Arc::new(repos.containers),
            samples: Arc::new(repos.samples),
            subscriptions: Arc::new(repos.subscriptions),
            notifications: Arc::new(repos.notifications),
        }
    }
}

/// A container of a product ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishEvent {
    pub subject_id: SubjectId,
    pub product_id: ProductId,
    pub container_id: ContainerId,
    pub acquired_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Result of handling a finish event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FinishOutcome {
    /// The sample was recorded; the subject has no reminder for this product
    NoSubscription,
    /// The subscription's schedule was recomputed
    Rescheduled {
        subscription_id: SubscriptionId,
        cycle_days: u32,
        /// Whether the estimate replaced the previous cycle length
        cycle_updated: bool,
        next_reminder_at: DateTime<Utc>,
    },
}

/// Totals for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Subscriptions notified and rescheduled
    pub processed: u32,
    /// Subscriptions skipped or left half-done
    pub failed: u32,
}

/// Adaptive reorder-reminder scheduler
#[derive(Clone)]
pub struct ReminderScheduler {
    stores: ReminderStores,
    config: ReminderConfig,
}

impl ReminderScheduler {
    /// Create a new scheduler
    pub fn new(stores: ReminderStores, config: ReminderConfig) -> Self {
        Self { stores, config }
    }

    /// Scheduler configuration
    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Mark a subject's container finished and reschedule its product.
    ///
    /// The finish time is validated and the sample recorded before the
    /// container is touched, so a rejected or failed request leaves the
    /// container active and can be retried.
    #[instrument(skip(self), fields(subject_id = %subject_id, container_id = %container_id))]
    pub async fn finish_container(
        &self,
        subject_id: SubjectId,
        container_id: ContainerId,
        finished_at: DateTime<Utc>,
    ) -> Result<FinishOutcome, ReminderError> {
        let row = self
            .stores
            .containers
            .find_for_subject(container_id.0, subject_id.0)
            .await?
            .ok_or(ReminderError::ContainerNotFound)?;
        let container = Container::try_from(row).map_err(DbError::from)?;

        if container.is_finished() {
            return Err(ReminderError::ContainerAlreadyFinished);
        }

        let event = FinishEvent {
            subject_id,
            product_id: container.product_id,
            container_id,
            acquired_at: container.acquired_at,
            finished_at,
        };
        self.record_sample(&sample_from(&event)?).await?;

        // Guarded by status, so a concurrent finish loses here
        if !self
            .stores
            .containers
            .mark_finished(container_id.0, finished_at)
            .await?
        {
            return Err(ReminderError::ContainerAlreadyFinished);
        }

        self.reschedule(&event).await
    }

    /// Record a consumption sample and recompute the subscription schedule
    #[instrument(skip(self, event), fields(
        subject_id = %event.subject_id,
        product_id = %event.product_id,
        container_id = %event.container_id,
    ))]
    pub async fn on_finished(&self, event: FinishEvent) -> Result<FinishOutcome, ReminderError> {
        self.record_sample(&sample_from(&event)?).await?;
        self.reschedule(&event).await
    }

    // One sample per container; recording again replaces it
    async fn record_sample(&self, sample: &ConsumptionSample) -> Result<(), ReminderError> {
        self.stores
            .samples
            .insert(CreateConsumptionSample {
                id: Uuid::new_v4(),
                subject_id: sample.subject_id.0,
                product_id: sample.product_id.0,
                container_id: sample.container_id.0,
                acquired_at: sample.acquired_at,
                finished_at: sample.finished_at,
                duration_days: i32::try_from(sample.duration_days()).unwrap_or(i32::MAX),
            })
            .await?;
        metrics::counter!("reminder_samples_recorded_total").increment(1);
        Ok(())
    }

    async fn reschedule(&self, event: &FinishEvent) -> Result<FinishOutcome, ReminderError> {
        let Some(row) = self
            .stores
            .subscriptions
            .find_by_subject_and_product(event.subject_id.0, event.product_id.0)
            .await?
        else {
            debug!("No reminder subscription for product");
            return Ok(FinishOutcome::NoSubscription);
        };
        let subscription = ReminderSubscription::try_from(row).map_err(DbError::from)?;

        let recent: Vec<ConsumptionSample> = self
            .stores
            .samples
            .find_recent(
                event.subject_id.0,
                event.product_id.0,
                i64::from(self.config.sample_window),
            )
            .await?
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                ConsumptionSample::try_from(row)
                    .map_err(|e| warn!(sample_id = %id, error = %e, "Skipping invalid sample"))
                    .ok()
            })
            .collect();

        let estimate = estimate_cycle(&recent, self.config.max_cycle_days);
        let cycle_days = estimate.unwrap_or(subscription.current_cycle_days);
        let cycle_updated = estimate.is_some_and(|days| days != subscription.current_cycle_days);
        let next_reminder_at = reminder_after(event.finished_at, cycle_days).ok_or(
            DomainError::ScheduleOutOfRange {
                from: event.finished_at,
                cycle_days,
            },
        )?;

        self.stores
            .subscriptions
            .update_schedule(
                subscription.id.0,
                ScheduleUpdate {
                    current_cycle_days: i32::try_from(cycle_days).unwrap_or(i32::MAX),
                    last_finished_at: event.finished_at,
                    next_reminder_at,
                },
            )
            .await
            .map_err(|e| {
                error!(subscription_id = %subscription.id, error = %e, "Failed to update reminder schedule");
                e
            })?;

        info!(
            subscription_id = %subscription.id,
            samples = recent.len(),
            cycle_days,
            cycle_updated,
            next_reminder_at = %next_reminder_at,
            "Reminder rescheduled"
        );

        Ok(FinishOutcome::Rescheduled {
            subscription_id: subscription.id,
            cycle_days,
            cycle_updated,
            next_reminder_at,
        })
    }

    /// Emit one reminder per due subscription and push each one cycle past `now`.
    ///
    /// Per-row failures are counted and logged; only the initial query can
    /// fail the sweep.
    #[instrument(skip(self), fields(now = %now))]
    pub async fn sweep_due_reminders(&self, now: DateTime<Utc>) -> Result<SweepReport, ReminderError> {
        let due = self.stores.subscriptions.find_due(now).await.map_err(|e| {
            error!(error = %e, "Failed to query due subscriptions");
            e
        })?;

        let mut report = SweepReport::default();
        for row in due {
            let id = row.id;
            let subscription = match ReminderSubscription::try_from(row) {
                Ok(subscription) => subscription,
                Err(e) => {
                    warn!(subscription_id = %id, error = %e, "Skipping invalid subscription");
                    report.failed += 1;
                    continue;
                }
            };

            if self.remind(&subscription, now).await {
                report.processed += 1;
            } else {
                report.failed += 1;
                metrics::counter!("reminder_sweep_failures_total").increment(1);
            }
        }

        info!(processed = report.processed, failed = report.failed, "Reminder sweep complete");
        Ok(report)
    }

    async fn remind(&self, subscription: &ReminderSubscription, now: DateTime<Utc>) -> bool {
        let Some(next) = subscription.reminder_after(now) else {
            warn!(
                subscription_id = %subscription.id,
                cycle_days = subscription.current_cycle_days,
                "Next reminder out of range, skipping"
            );
            return false;
        };

        let notification = NewNotification::subscription_reminder(subscription);
        let create = CreateNotification {
            id: Uuid::new_v4(),
            subject_id: notification.subject_id.0,
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            body: notification.body,
            data: notification.data,
        };

        // Not rescheduled, so the next sweep retries it
        if let Err(e) = self.stores.notifications.create(create).await {
            warn!(subscription_id = %subscription.id, error = %e, "Failed to emit reminder");
            return false;
        }
        metrics::counter!("reminder_notifications_emitted_total").increment(1);

        if let Err(e) = self
            .stores
            .subscriptions
            .update_next_reminder(subscription.id.0, next)
            .await
        {
            error!(
                subscription_id = %subscription.id,
                error = %e,
                "Reminder emitted but not rescheduled"
            );
            return false;
        }

        debug!(subscription_id = %subscription.id, next_reminder_at = %next, "Reminder emitted");
        true
    }
}

fn sample_from(event: &FinishEvent) -> Result<ConsumptionSample, ReminderError> {
    Ok(ConsumptionSample::new(
        event.subject_id,
        event.product_id,
        event.container_id,
        event.acquired_at,
        event.finished_at,
    )?)
}
