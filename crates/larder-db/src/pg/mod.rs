//! PostgreSQL repository implementations

mod consumption;
mod container;
mod notification;
mod subscription;

pub use consumption::PgConsumptionRepository;
pub use container::PgContainerRepository;
pub use notification::PgNotificationRepository;
pub use subscription::PgSubscriptionRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub containers: PgContainerRepository,
    pub samples: PgConsumptionRepository,
    pub subscriptions: PgSubscriptionRepository,
    pub notifications: PgNotificationRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            containers: PgContainerRepository::new(pool.clone()),
            samples: PgConsumptionRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            notifications: PgNotificationRepository::new(pool),
        }
    }
}
