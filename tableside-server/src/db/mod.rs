//! Database layer
//!
//! One SQLite database holds the tenant directory; every tenant gets its
//! own SQLite database with tables, notifications and raw events. Store
//! functions take an explicit connection so callers decide whether they
//! run inside a transaction.

pub mod events;
pub mod notifications;
pub mod pool;
pub mod tables;
pub mod tenants;

use thiserror::Error;

/// Errors raised by the store layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for shared::AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Store error");
        shared::AppError::database("Database error")
    }
}
