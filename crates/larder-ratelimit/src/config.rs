//! Rate limiting configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Deployment classification.
///
/// Outside production, a limiter "deny" is relaxed into an allow so lower
/// environments are not throttled. Infra-failure handling is identical in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Quota denials are enforced
    #[default]
    Production,
    /// Quota denials are logged and let through
    NonProduction,
}

impl Environment {
    /// Whether quota denials are enforced
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            _ => Ok(Self::NonProduction),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::NonProduction => f.write_str("non-production"),
        }
    }
}

/// Breaker configuration
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive infra failures before failing closed
    pub fail_open_threshold: u32,
    /// Alert on every Nth consecutive infra failure
    pub alert_every: u32,
    /// Minimum spacing between alerts
    pub alert_interval: Duration,
    /// How long to stay fail-closed before retrying fail-open
    pub fail_closed_cooldown: Duration,
    /// Deployment classification
    pub environment: Environment,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            fail_open_threshold: 20,
            alert_every: 5,
            alert_interval: Duration::from_secs(60 * 60),
            fail_closed_cooldown: Duration::from_secs(60 * 60),
            environment: Environment::Production,
        }
    }
}

impl BreakerConfig {
    /// Create a new breaker configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fail-open threshold (at least 1)
    #[must_use]
    pub fn with_fail_open_threshold(mut self, threshold: u32) -> Self {
        self.fail_open_threshold = threshold.max(1);
        self
    }

    /// Set the alert cadence (at least 1)
    #[must_use]
    pub fn with_alert_every(mut self, every: u32) -> Self {
        self.alert_every = every.max(1);
        self
    }

    /// Set the minimum spacing between alerts
    #[must_use]
    pub fn with_alert_interval(mut self, interval: Duration) -> Self {
        self.alert_interval = interval;
        self
    }

    /// Set the fail-closed cooldown
    #[must_use]
    pub fn with_fail_closed_cooldown(mut self, cooldown: Duration) -> Self {
        self.fail_closed_cooldown = cooldown;
        self
    }

    /// Set the deployment classification
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

/// Sliding-window quota applied per subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindow {
    /// Requests allowed per window
    pub limit: u32,
    /// Window length
    pub window: Duration,
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self {
            limit: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl SlidingWindow {
    /// Create a window of `limit` requests per `window`
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    /// Window length in milliseconds, never zero
    pub fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX).max(1)
    }
}
