//! Configuration for the Reminder API service.

use std::str::FromStr;
use std::time::Duration;

use larder_ratelimit::{BreakerConfig, Environment, SlidingWindow};
use larder_reminder_core::ReminderConfig;

/// Shared Redis REST endpoint for the AI rate limiter
#[derive(Clone)]
pub struct RedisRestConfig {
    pub url: String,
    pub token: String,
}

impl std::fmt::Debug for RedisRestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRestConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Reminder API configuration
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Apply pending migrations at startup
    pub run_migrations: bool,
    /// Shared secret expected in `x-cron-secret`
    pub cron_secret: String,
    /// Deployment environment
    pub environment: Environment,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
    /// Reminder scheduling configuration
    pub reminder: ReminderConfig,
    /// Rate limiter breaker configuration
    pub breaker: BreakerConfig,
    /// AI request quota
    pub rate_limit_window: SlidingWindow,
    /// Redis REST endpoint; the in-process limiter is used when absent
    pub redis: Option<RedisRestConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let run_migrations = parse_or("RUN_MIGRATIONS", false)?;

        // Server
        let http_port = parse_or("HTTP_PORT", 8080u16)?;

        let cron_secret = std::env::var("CRON_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("CRON_SECRET"))?;

        // Anything other than production relaxes quota denials
        let environment = std::env::var("APP_ENV")
            .map(|env| Environment::from_str(&env).unwrap_or_default())
            .unwrap_or_default();

        let request_timeout_secs: u64 = parse_or("REQUEST_TIMEOUT_SECS", 30)?;

        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        // Reminders
        let reminder = ReminderConfig::new()
            .with_max_cycle_days(parse_or("REMINDER_MAX_CYCLE_DAYS", 365)?);

        // Rate limiting
        let breaker = BreakerConfig::new()
            .with_fail_open_threshold(parse_or("RATE_LIMIT_FAIL_OPEN_THRESHOLD", 20)?)
            .with_environment(environment);

        let rate_limit_window = SlidingWindow::new(
            parse_or("RATE_LIMIT_REQUESTS", 10)?,
            Duration::from_secs(parse_or("RATE_LIMIT_WINDOW_SECS", 60)?),
        );

        let redis = match (
            std::env::var("UPSTASH_REDIS_REST_URL").ok(),
            std::env::var("UPSTASH_REDIS_REST_TOKEN").ok(),
        ) {
            (Some(url), Some(token)) => Some(RedisRestConfig { url, token }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("UPSTASH_REDIS_REST_TOKEN")),
            (None, Some(_)) => return Err(ConfigError::Missing("UPSTASH_REDIS_REST_URL")),
        };

        Ok(Self {
            http_port,
            database_url,
            run_migrations,
            cron_secret,
            environment,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
            reminder,
            breaker,
            rate_limit_window,
            redis,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("run_migrations", &self.run_migrations)
            .field("environment", &self.environment)
            .field("request_timeout", &self.request_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("reminder", &self.reminder)
            .field("breaker", &self.breaker)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("redis", &self.redis)
            .finish_non_exhaustive()
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
