//! Notification events

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ReminderSubscription, SubjectId};

/// Kind of notification emitted to a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Time to repurchase a subscribed product
    SubscriptionReminder,
}

impl NotificationKind {
    /// Database / wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionReminder => "subscription_reminder",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification to be handed to delivery (push, email, in-app)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub subject_id: SubjectId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

impl NewNotification {
    /// Reorder reminder for a due subscription
    pub fn subscription_reminder(subscription: &ReminderSubscription) -> Self {
        Self {
            subject_id: subscription.subject_id,
            kind: NotificationKind::SubscriptionReminder,
            title: "Time to reorder".to_string(),
            body: format!(
                "Your {}-day reorder cycle is up.",
                subscription.current_cycle_days
            ),
            data: json!({
                "subscription_id": subscription.id,
                "product_id": subscription.product_id,
            }),
        }
    }
}
