//! Reorder-reminder subscription types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, ProductId, SubjectId, SubscriptionId};

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Reminders are sent
    Active,
    /// Temporarily not reminding
    Paused,
    /// Subject cancelled the subscription
    Cancelled,
}

impl SubscriptionStatus {
    /// Database / wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(DomainError::UnknownSubscriptionStatus(other.to_string())),
        }
    }
}

/// A subject's reorder-reminder subscription for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSubscription {
    /// Subscription ID
    pub id: SubscriptionId,
    /// Subject who owns the subscription
    pub subject_id: SubjectId,
    /// Product to remind about
    pub product_id: ProductId,
    /// Subscription status
    pub status: SubscriptionStatus,
    /// Current estimated reorder cycle, always at least one day
    pub current_cycle_days: u32,
    /// When the last container of this product was finished
    pub last_finished_at: Option<DateTime<Utc>>,
    /// When the next reminder is due
    pub next_reminder_at: DateTime<Utc>,
}

impl ReminderSubscription {
    /// One current cycle after `from`
    pub fn reminder_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        reminder_after(from, self.current_cycle_days)
    }
}

/// `from` plus `cycle_days` whole days, or `None` past the representable range
pub fn reminder_after(from: DateTime<Utc>, cycle_days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(cycle_days)).and_then(|cycle| from.checked_add_signed(cycle))
}
