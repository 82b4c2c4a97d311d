//! Redis REST sliding-window backend
//!
//! Speaks the Upstash-style REST protocol: a JSON command array POSTed with a
//! bearer token, answered with `{"result": ...}` or `{"error": "..."}`. The
//! quota check runs as a single `EVAL` so concurrent instances share one
//! window per subject.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::backend::{BackendError, LimitResponse, LimiterBackend};
use crate::config::SlidingWindow;

/// Weighted sliding window over the current and previous fixed windows.
///
/// Returns `-1` when the request does not fit, otherwise the remaining quota.
const SLIDING_WINDOW_SCRIPT: &str = r#"
local currentKey  = KEYS[1]
local previousKey = KEYS[2]
local tokens      = tonumber(ARGV[1])
local now         = tonumber(ARGV[2])
local window      = tonumber(ARGV[3])
local incrementBy = tonumber(ARGV[4])

local requestsInCurrentWindow = redis.call("GET", currentKey)
if requestsInCurrentWindow == false then
  requestsInCurrentWindow = 0
end

local requestsInPreviousWindow = redis.call("GET", previousKey)
if requestsInPreviousWindow == false then
  requestsInPreviousWindow = 0
end

local percentageInCurrent = (now % window) / window
requestsInPreviousWindow = math.floor((1 - percentageInCurrent) * requestsInPreviousWindow)

if requestsInPreviousWindow + requestsInCurrentWindow >= tokens then
  return -1
end

local newValue = redis.call("INCRBY", currentKey, incrementBy)
if newValue == incrementBy then
  redis.call("PEXPIRE", currentKey, window * 2 + 1000)
end
return tokens - (newValue + requestsInPreviousWindow)
"#;

/// Maximum error body kept in [`BackendError::Status`]
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Sliding-window limiter backed by a Redis REST endpoint
#[derive(Debug, Clone)]
pub struct RestLimiterBackend {
    client: reqwest::Client,
    url: String,
    token: String,
    window: SlidingWindow,
    prefix: String,
}

impl RestLimiterBackend {
    /// Default request timeout for limiter calls
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Create a backend for the REST endpoint at `url`
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        window: SlidingWindow,
    ) -> Result<Self, BackendError> {
        Self::with_timeout(url, token, window, Self::DEFAULT_TIMEOUT)
    }

    /// Create a backend with an explicit request timeout
    pub fn with_timeout(
        url: impl Into<String>,
        token: impl Into<String>,
        window: SlidingWindow,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            window,
            prefix: "larder:ratelimit".to_string(),
        })
    }

    /// Override the Redis key prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Keys for the current and previous windows at `now_ms`, plus the reset instant
    fn window_keys(&self, key: &str, now_ms: i64) -> (String, String, i64) {
        let window_ms = self.window.window_millis();
        let current = now_ms.div_euclid(window_ms);
        let reset_at_ms = (current + 1).saturating_mul(window_ms);

        (
            format!("{}:{}:{}", self.prefix, key, current),
            format!("{}:{}:{}", self.prefix, key, current - 1),
            reset_at_ms,
        )
    }
}

#[async_trait]
impl LimiterBackend for RestLimiterBackend {
    async fn limit(&self, key: &str, now: DateTime<Utc>) -> Result<LimitResponse, BackendError> {
        let now_ms = now.timestamp_millis();
        let (current_key, previous_key, reset_at_ms) = self.window_keys(key, now_ms);

        let command = json!([
            "EVAL",
            SLIDING_WINDOW_SCRIPT,
            "2",
            current_key,
            previous_key,
            self.window.limit.to_string(),
            now_ms.to_string(),
            self.window.window_millis().to_string(),
            "1",
        ]);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(MAX_ERROR_BODY);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: RestReply = response.json().await?;
        if let Some(error) = reply.error {
            return Err(BackendError::Remote(error));
        }

        let remaining = reply
            .result
            .as_ref()
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| {
                BackendError::Protocol(format!("expected integer result, got {:?}", reply.result))
            })?;

        let reset_at = Utc
            .timestamp_millis_opt(reset_at_ms)
            .single()
            .ok_or_else(|| BackendError::Protocol(format!("reset time out of range: {reset_at_ms}")))?;

        debug!(key, remaining, "limiter answered");

        Ok(LimitResponse {
            success: remaining >= 0,
            reset_at,
        })
    }

    fn name(&self) -> &'static str {
        "redis_rest"
    }
}
