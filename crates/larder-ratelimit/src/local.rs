//! In-process limiter backend using the governor crate.
//!
//! Used when no shared Redis endpoint is configured. Each process keeps its own
//! quota, so this is only suitable for single-instance and local deployments.

use std::num::NonZeroU32;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::{Clock as _, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::backend::{BackendError, LimitResponse, LimiterBackend};
use crate::config::SlidingWindow;

/// Keyed GCRA limiter approximating a sliding window
pub struct LocalLimiterBackend {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl LocalLimiterBackend {
    /// Allow `window.limit` requests per `window.window`, bursting up to the full limit
    #[must_use]
    pub fn new(window: SlidingWindow) -> Self {
        let burst = NonZeroU32::new(window.limit).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window.window / burst.get())
            .map(|quota| quota.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst));

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Number of subjects currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Drop state for subjects whose quota has fully replenished
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

impl std::fmt::Debug for LocalLimiterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLimiterBackend")
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}

#[async_trait]
impl LimiterBackend for LocalLimiterBackend {
    async fn limit(&self, key: &str, now: DateTime<Utc>) -> Result<LimitResponse, BackendError> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(LimitResponse::allowed(now)),
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                let wait = chrono::Duration::from_std(wait).unwrap_or_else(|_| chrono::Duration::zero());
                Ok(LimitResponse::denied(now + wait))
            }
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
