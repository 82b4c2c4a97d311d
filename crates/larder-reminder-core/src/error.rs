//! Reminder errors

use larder_db::DbError;
use larder_types::DomainError;
use thiserror::Error;

/// Reminder scheduling errors
#[derive(Error, Debug)]
pub enum ReminderError {
    /// Input rejected before any state was touched
    #[error("validation error: {0}")]
    Validation(#[from] DomainError),

    /// No container with that ID belongs to the subject
    #[error("container not found")]
    ContainerNotFound,

    /// The container was already marked finished
    #[error("container already finished")]
    ContainerAlreadyFinished,

    /// Storage read or write failed
    #[error("persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl ReminderError {
    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound)
    }

    /// Check if this is a persistence error
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
