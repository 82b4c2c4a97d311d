//! Larder DB - Database abstractions
//!
//! SQLx-based persistence for the reorder-reminder subsystem: containers,
//! consumption samples, reminder subscriptions and notifications.
//!
//! # Example
//!
//! ```rust,ignore
//! use larder_db::{create_pool, run_migrations, Repositories, SubscriptionRepository};
//!
//! let pool = create_pool("postgres://localhost/larder").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let due = repos.subscriptions.find_due(chrono::Utc::now()).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
