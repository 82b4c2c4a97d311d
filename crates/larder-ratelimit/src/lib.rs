//! Larder Rate Limit - Breaker around the AI request limiter
//!
//! AI-backed endpoints are guarded by a remote sliding-window limiter. When the
//! limiter backend itself is unreachable, [`RateLimitBreaker`] keeps requests
//! flowing (fail-open) for a bounded number of consecutive failures, then denies
//! them (fail-closed) until a cooldown passes.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use larder_ratelimit::{BreakerConfig, RateLimitBreaker, RestLimiterBackend, SlidingWindow, SystemClock};
//!
//! let backend = RestLimiterBackend::new(url, token, SlidingWindow::default())?;
//! let breaker = RateLimitBreaker::new(Arc::new(backend), Arc::new(SystemClock), BreakerConfig::default());
//!
//! let decision = breaker.check(&subject_id).await;
//! if !decision.is_allowed() {
//!     // map to 429 at the boundary
//! }
//! ```
//!
//! # Backends
//!
//! - [`RestLimiterBackend`] - Redis REST sliding window shared by every instance
//! - [`LocalLimiterBackend`] - in-process `governor` limiter for local development

pub mod backend;
pub mod breaker;
pub mod clock;
pub mod config;
pub mod decision;
pub mod local;
pub mod rest;

pub use backend::{BackendError, LimitResponse, LimiterBackend};
pub use breaker::{BreakerPhase, BreakerSnapshot, RateLimitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BreakerConfig, Environment, SlidingWindow};
pub use decision::RateLimitDecision;
pub use local::LocalLimiterBackend;
pub use rest::RestLimiterBackend;
