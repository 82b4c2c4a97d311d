//! Fail-open / fail-closed breaker around the limiter backend.
//!
//! # State Machine
//!
//! - **Healthy**: no consecutive infra failures
//! - **Degraded**: some consecutive infra failures, below threshold; requests
//!   fail open
//! - **Fail-closed**: threshold reached; requests are refused until the
//!   cooldown since entry has elapsed, after which the counter resets and the
//!   breaker fails open again
//!
//! Any answer from the backend (allow or deny) resets the breaker to healthy.
//! Quota denials never count as infra failures.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, warn};

use larder_types::SubjectId;

use crate::backend::LimiterBackend;
use crate::clock::Clock;
use crate::config::BreakerConfig;
use crate::decision::RateLimitDecision;

/// Coarse breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerPhase {
    Healthy,
    Degraded,
    FailClosed,
}

impl BreakerPhase {
    /// Label for logs and readiness output
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::FailClosed => "fail_closed",
        }
    }
}

/// Point-in-time view of the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub phase: BreakerPhase,
    pub consecutive_infra_failures: u32,
    pub fail_closed_since: Option<DateTime<Utc>>,
    pub last_alert_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_infra_failures: u32,
    fail_closed_since: Option<DateTime<Utc>>,
    last_alert_at: Option<DateTime<Utc>>,
}

/// Whether strictly more than `span` has passed between `since` and `now`
fn elapsed_more_than(since: DateTime<Utc>, now: DateTime<Utc>, span: Duration) -> bool {
    (now - since).to_std().is_ok_and(|elapsed| elapsed > span)
}

/// Rate limiter with a fail-open/fail-closed breaker.
///
/// One instance per process; state is shared by every concurrent caller.
pub struct RateLimitBreaker {
    backend: Arc<dyn LimiterBackend>,
    clock: Arc<dyn Clock>,
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl RateLimitBreaker {
    /// Create a new breaker
    pub fn new(backend: Arc<dyn LimiterBackend>, clock: Arc<dyn Clock>, config: BreakerConfig) -> Self {
        Self {
            backend,
            clock,
            config,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Get the breaker configuration
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Name of the wrapped backend
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // Never held across an await.
    fn state(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether `subject` may make an AI-backed request.
    ///
    /// Never fails: limiter outages are folded into the decision.
    pub async fn check(&self, subject: &SubjectId) -> RateLimitDecision {
        let now = self.clock.now();
        let key = subject.to_string();

        let decision = match self.backend.limit(&key, now).await {
            Ok(response) => {
                self.record_answer();

                if response.success {
                    RateLimitDecision::Allowed
                } else if self.config.environment.is_production() {
                    let retry_after_secs =
                        u64::try_from((response.reset_at - now).num_seconds()).unwrap_or(0);
                    RateLimitDecision::Denied { retry_after_secs }
                } else {
                    debug!(
                        subject = %subject,
                        environment = %self.config.environment,
                        "quota exceeded, relaxed outside production"
                    );
                    RateLimitDecision::Allowed
                }
            }
            Err(err) => {
                warn!(
                    subject = %subject,
                    backend = self.backend.name(),
                    error = %err,
                    "rate limiter backend failed"
                );
                metrics::counter!("ratelimit_infra_failures_total", "backend" => self.backend.name())
                    .increment(1);
                self.record_infra_failure(now)
            }
        };

        metrics::counter!("ratelimit_decisions_total", "outcome" => decision.as_str()).increment(1);
        decision
    }

    fn record_answer(&self) {
        let mut state = self.state();
        if state.consecutive_infra_failures > 0 || state.fail_closed_since.is_some() {
            debug!(
                previous_failures = state.consecutive_infra_failures,
                "rate limiter backend recovered"
            );
        }
        state.consecutive_infra_failures = 0;
        state.fail_closed_since = None;
        metrics::gauge!("ratelimit_consecutive_infra_failures").set(0.0);
    }

    fn record_infra_failure(&self, now: DateTime<Utc>) -> RateLimitDecision {
        let mut state = self.state();
        state.consecutive_infra_failures = state.consecutive_infra_failures.saturating_add(1);
        let failures = state.consecutive_infra_failures;

        // Alert cadence only reads the counter
        let alert_due = state
            .last_alert_at
            .map_or(true, |last| elapsed_more_than(last, now, self.config.alert_interval));
        if failures % self.config.alert_every.max(1) == 0 && alert_due {
            state.last_alert_at = Some(now);
            metrics::counter!("ratelimit_alerts_total").increment(1);
            error!(
                consecutive_failures = failures,
                threshold = self.config.fail_open_threshold,
                "ALERT: rate limiter backend failing repeatedly"
            );
        }

        if failures >= self.config.fail_open_threshold {
            match state.fail_closed_since {
                None => {
                    state.fail_closed_since = Some(now);
                    error!(consecutive_failures = failures, "rate limiter failing closed");
                    metrics::gauge!("ratelimit_consecutive_infra_failures").set(f64::from(failures));
                    return RateLimitDecision::FailClosed;
                }
                Some(since) if elapsed_more_than(since, now, self.config.fail_closed_cooldown) => {
                    state.consecutive_infra_failures = 0;
                    state.fail_closed_since = None;
                    warn!(
                        fail_closed_since = %since,
                        "fail-closed cooldown elapsed, resetting failure count"
                    );
                }
                Some(_) => {
                    metrics::gauge!("ratelimit_consecutive_infra_failures").set(f64::from(failures));
                    return RateLimitDecision::FailClosed;
                }
            }
        }

        let failures = state.consecutive_infra_failures;
        metrics::gauge!("ratelimit_consecutive_infra_failures").set(f64::from(failures));
        warn!(
            consecutive_failures = failures,
            threshold = self.config.fail_open_threshold,
            "rate limiter failing open"
        );
        RateLimitDecision::FailedOpen
    }

    /// Current breaker state
    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = self.clock.now();
        let state = self.state();

        let phase = match state.fail_closed_since {
            Some(since)
                if state.consecutive_infra_failures >= self.config.fail_open_threshold
                    && !elapsed_more_than(since, now, self.config.fail_closed_cooldown) =>
            {
                BreakerPhase::FailClosed
            }
            _ if state.consecutive_infra_failures == 0 => BreakerPhase::Healthy,
            _ => BreakerPhase::Degraded,
        };

        BreakerSnapshot {
            phase,
            consecutive_infra_failures: state.consecutive_infra_failures,
            fail_closed_since: state.fail_closed_since,
            last_alert_at: state.last_alert_at,
        }
    }
}

impl std::fmt::Debug for RateLimitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitBreaker")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
