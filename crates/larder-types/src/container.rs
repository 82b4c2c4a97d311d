//! Pantry containers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContainerId, DomainError, ProductId, SubjectId};

/// Lifecycle state of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    /// Still in the pantry
    Active,
    /// Used up
    Empty,
}

impl ContainerStatus {
    /// Database / wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "empty" => Ok(Self::Empty),
            other => Err(DomainError::UnknownContainerStatus(other.to_string())),
        }
    }
}

/// A physical unit of a product tracked from acquisition to depletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub subject_id: SubjectId,
    pub product_id: ProductId,
    pub status: ContainerStatus,
    pub acquired_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Container {
    /// Whether the container has already been marked finished
    pub fn is_finished(&self) -> bool {
        self.status == ContainerStatus::Empty || self.finished_at.is_some()
    }
}
