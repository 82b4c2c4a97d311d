//! Common test utilities for larder-reminder-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{
    MockConsumptionRepository, MockContainerRepository, MockNotificationRepository,
    MockSubscriptionRepository,
};
