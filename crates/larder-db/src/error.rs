//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failure
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// A stored row violates a domain invariant
    #[error("invalid row: {0}")]
    Decode(#[from] larder_types::DomainError),
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
