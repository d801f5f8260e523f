//! Tenant directory (main database)

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::StoreResult;

/// Tenant row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TenantRecord {
    pub id: i64,
    pub name: String,
    pub domain: String,
    /// Tenant database name; the file is `{data_dir}/tenants/{database}.db`
    pub database: String,
    pub status: String,
    pub created_at: i64,
}

impl TenantRecord {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> StoreResult<Option<TenantRecord>> {
    let row = sqlx::query_as(
        "SELECT id, name, domain, database, status, created_at FROM tenants WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Look up a tenant by its (lowercase, port-stripped) domain
pub async fn find_by_domain(pool: &SqlitePool, domain: &str) -> StoreResult<Option<TenantRecord>> {
    let row = sqlx::query_as(
        "SELECT id, name, domain, database, status, created_at FROM tenants WHERE domain = ?",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn insert_tenant(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    domain: &str,
    database: &str,
    now: i64,
) -> StoreResult<TenantRecord> {
    let row = sqlx::query_as(
        r#"
        INSERT INTO tenants (id, name, domain, database, status, created_at)
        VALUES (?, ?, ?, ?, 'active', ?)
        RETURNING id, name, domain, database, status, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(domain.to_ascii_lowercase())
    .bind(database)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn set_status(pool: &SqlitePool, id: i64, status: &str) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE tenants SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
