//! Application state for the Reminder API service.

use std::sync::Arc;

use larder_db::DbPool;
use larder_ratelimit::RateLimitBreaker;
use larder_reminder_core::ReminderScheduler;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Reminder scheduler (finish events and sweeps)
    pub scheduler: Arc<ReminderScheduler>,
    /// AI rate limiter with its fail-open/fail-closed breaker
    pub limiter: Arc<RateLimitBreaker>,
    /// Database pool (readiness checks)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        scheduler: ReminderScheduler,
        limiter: RateLimitBreaker,
        pool: DbPool,
        config: Config,
    ) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            limiter: Arc::new(limiter),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
