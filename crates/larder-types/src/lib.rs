//! Larder Types - Shared domain types
//!
//! This crate contains domain types used across Larder services:
//! - Subject, product, container and subscription identifiers
//! - Containers and the consumption samples recorded when they run out
//! - Reorder-reminder subscriptions
//! - Notifications emitted to subjects

pub mod consumption;
pub mod container;
pub mod error;
pub mod ids;
pub mod notification;
pub mod subscription;

pub use consumption::*;
pub use container::*;
pub use error::*;
pub use ids::*;
pub use notification::*;
pub use subscription::*;
