//! Larder Reminder Core - Reorder reminder logic
//!
//! Learns how long a subject takes to get through a product and reminds them
//! to reorder when the next container should be running out.
//!
//! # Example
//!
//! ```rust,ignore
//! use larder_db::Repositories;
//! use larder_reminder_core::{ReminderConfig, ReminderScheduler, ReminderStores};
//!
//! let scheduler = ReminderScheduler::new(
//!     ReminderStores::from_repositories(Repositories::new(pool)),
//!     ReminderConfig::new().with_max_cycle_days(180),
//! );
//!
//! // A container ran out
//! let outcome = scheduler.finish_container(subject_id, container_id, Utc::now()).await?;
//!
//! // Periodic sweep
//! let report = scheduler.sweep_due_reminders(Utc::now()).await?;
//! ```

pub mod config;
pub mod cycle;
pub mod error;
pub mod scheduler;

pub use config::ReminderConfig;
pub use cycle::{estimate_cycle, estimate_from_durations};
pub use error::ReminderError;
pub use scheduler::{FinishEvent, FinishOutcome, ReminderScheduler, ReminderStores, SweepReport};
