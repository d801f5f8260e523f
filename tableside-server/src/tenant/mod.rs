//! Tenant scoping
//!
//! A [`TenantDb`] is the only way to reach a tenant database. Handlers get
//! one from the tenant middleware and pass it explicitly to every store and
//! policy call, so a notification can never be written for a tenant other
//! than the one the request was resolved to.

pub mod middleware;
pub mod registry;

pub use middleware::resolve_tenant;
pub use registry::{TenantRegistry, TenantStorage};

use shared::error::{AppError, ErrorCode};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;

use crate::db::{StoreError, StoreResult};

/// Handle to one tenant's database
#[derive(Debug, Clone)]
pub struct TenantDb {
    tenant_id: i64,
    database: String,
    pool: SqlitePool,
}

impl TenantDb {
    pub(crate) fn new(tenant_id: i64, database: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            tenant_id,
            database: database.into(),
            pool,
        }
    }

    pub fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    /// Name of the tenant database
    pub fn database(&self) -> &str {
        &self.database
    }

    pub async fn acquire(&self) -> StoreResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    pub async fn begin(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }
}

/// Tenant id attached to responses for request logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTenant(pub i64);

/// Tenant resolution failures
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("no tenant selected for this request")]
    NotSelected,

    #[error("tenant not found: {0}")]
    NotFound(String),

    #[error("tenant {0} is not active")]
    Suspended(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TenantError> for AppError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NotSelected => AppError::new(ErrorCode::TenantNotSelected),
            TenantError::NotFound(key) => {
                AppError::new(ErrorCode::TenantNotFound).with_detail("tenant", key)
            }
            TenantError::Suspended(id) => {
                AppError::new(ErrorCode::TenantSuspended).with_detail("tenant_id", id)
            }
            TenantError::Store(e) => e.into(),
        }
    }
}
