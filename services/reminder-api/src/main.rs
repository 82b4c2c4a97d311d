//! Larder Reminder API
//!
//! Reorder-reminder microservice with a rate-limited AI preflight.
//!
//! ## REST Endpoints
//!
//! - `POST /api/v1/pantry/finish` - Mark a container finished and reschedule its reminder
//! - `GET|POST /api/v1/cron/subscription-reminder` - Emit due reminders (cron secret required)
//! - `GET /api/v1/ai/quota` - AI rate limit preflight
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (database and rate limiter breaker)
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod extractors;
mod handlers;
mod rate_limit;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use larder_db::Repositories;
use larder_ratelimit::{
    LimiterBackend, LocalLimiterBackend, RateLimitBreaker, RestLimiterBackend, SystemClock,
};
use larder_reminder_core::{ReminderScheduler, ReminderStores};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("reminder_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Larder Reminder API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        environment = %config.environment,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool
    let pool = larder_db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    if config.run_migrations {
        larder_db::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Reminder scheduler
    let stores = ReminderStores::from_repositories(Repositories::new(pool.clone()));
    let scheduler = ReminderScheduler::new(stores, config.reminder);

    // AI rate limiter
    let backend: Arc<dyn LimiterBackend> = match &config.redis {
        Some(redis) => Arc::new(RestLimiterBackend::new(
            redis.url.clone(),
            redis.token.clone(),
            config.rate_limit_window,
        )?),
        None => {
            tracing::warn!("No Redis REST endpoint configured, using in-process rate limiter");
            let local = Arc::new(LocalLimiterBackend::new(config.rate_limit_window));
            spawn_limiter_pruning(Arc::clone(&local), config.rate_limit_window.window);
            local as Arc<dyn LimiterBackend>
        }
    };
    let limiter = RateLimitBreaker::new(backend, Arc::new(SystemClock), config.breaker.clone());
    tracing::info!(backend = limiter.backend_name(), "Rate limiter ready");

    // Create application state
    let state = AppState::new(scheduler, limiter, pool, config.clone());

    // Build HTTP router
    let app = routes::build_router(state, metrics_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5, 5.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("reminder_operation_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!(
        "reminder_samples_recorded_total",
        "Total consumption samples recorded"
    );
    metrics::describe_counter!(
        "reminder_notifications_emitted_total",
        "Total reorder reminders emitted"
    );
    metrics::describe_counter!(
        "reminder_sweep_failures_total",
        "Subscriptions that failed during a sweep"
    );
    metrics::describe_counter!("reminder_sweeps_total", "Total completed reminder sweeps");
    metrics::describe_counter!(
        "ratelimit_decisions_total",
        "Rate limit decisions by outcome"
    );
    metrics::describe_counter!(
        "ratelimit_infra_failures_total",
        "Rate limiter backend failures by backend"
    );
    metrics::describe_counter!(
        "ratelimit_alerts_total",
        "Operational alerts raised for a failing rate limiter backend"
    );
    metrics::describe_gauge!(
        "ratelimit_consecutive_infra_failures",
        "Current consecutive rate limiter backend failures"
    );
    metrics::describe_histogram!(
        "reminder_operation_duration_seconds",
        "Handler operation latency in seconds by operation type"
    );

    Ok(handle)
}

/// Periodically forget subjects whose in-process quota has replenished
fn spawn_limiter_pruning(limiter: Arc<LocalLimiterBackend>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            limiter.retain_recent();
            tracing::debug!(tracked_keys = limiter.tracked_keys(), "Pruned in-process rate limiter");
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
