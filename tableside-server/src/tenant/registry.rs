//! Tenant registry: tenant directory lookups and per-tenant pools
//!
//! Tenant pools are opened lazily on first use and migrated before the
//! handle is handed out.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;

use super::{TenantDb, TenantError};
use crate::db::{self, StoreResult, tenants::TenantRecord};

/// Where tenant databases live
#[derive(Debug, Clone)]
pub enum TenantStorage {
    /// `{dir}/{database}.db`
    Dir(PathBuf),
    /// Private in-memory databases (tests, local demos)
    Memory,
}

#[derive(Clone)]
pub struct TenantRegistry {
    main: SqlitePool,
    storage: TenantStorage,
    open: Arc<RwLock<HashMap<i64, TenantDb>>>,
}

impl TenantRegistry {
    /// File-backed registry rooted at `data_dir`
    ///
    /// The tenant directory lives in `{data_dir}/main.db`, tenant databases
    /// under `{data_dir}/tenants/`.
    pub async fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        let tenants_dir = data_dir.join("tenants");
        std::fs::create_dir_all(&tenants_dir).map_err(sqlx::Error::Io)?;

        let main = db::pool::open_file(&data_dir.join("main.db")).await?;
        db::pool::migrate_main(&main).await?;
        Ok(Self::with_parts(main, TenantStorage::Dir(tenants_dir)))
    }

    /// Fully in-memory registry
    pub async fn in_memory() -> StoreResult<Self> {
        let main = db::pool::open_memory().await?;
        db::pool::migrate_main(&main).await?;
        Ok(Self::with_parts(main, TenantStorage::Memory))
    }

    fn with_parts(main: SqlitePool, storage: TenantStorage) -> Self {
        Self {
            main,
            storage,
            open: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a tenant in the directory and open (creating) its database
    ///
    /// Provisioning proper is handled elsewhere; this exists for seeding
    /// and tests.
    pub async fn register(&self, id: i64, name: &str, domain: &str) -> Result<TenantDb, TenantError> {
        let database = format!("tenant_{id}");
        let record = db::tenants::insert_tenant(
            &self.main,
            id,
            name,
            domain,
            &database,
            shared::util::now_millis(),
        )
        .await?;
        tracing::info!(tenant_id = id, domain = %record.domain, "Tenant registered");
        self.handle(&record).await
    }

    /// Mark a tenant active/suspended
    pub async fn set_status(&self, id: i64, status: &str) -> Result<bool, TenantError> {
        let updated = db::tenants::set_status(&self.main, id, status).await?;
        if status != "active" {
            self.open.write().await.remove(&id);
        }
        Ok(updated)
    }

    pub async fn resolve_id(&self, id: i64) -> Result<TenantDb, TenantError> {
        if let Some(handle) = self.open.read().await.get(&id) {
            return Ok(handle.clone());
        }
        let record = db::tenants::find_by_id(&self.main, id)
            .await?
            .ok_or_else(|| TenantError::NotFound(id.to_string()))?;
        self.handle(&record).await
    }

    /// Resolve a tenant from a `Host` header value (port stripped, case-insensitive)
    pub async fn resolve_domain(&self, host: &str) -> Result<TenantDb, TenantError> {
        let domain = normalize_host(host);
        if domain.is_empty() {
            return Err(TenantError::NotSelected);
        }
        let record = db::tenants::find_by_domain(&self.main, &domain)
            .await?
            .ok_or(TenantError::NotSelected)?;
        self.handle(&record).await
    }

    async fn handle(&self, record: &TenantRecord) -> Result<TenantDb, TenantError> {
        if !record.is_active() {
            return Err(TenantError::Suspended(record.id));
        }
        if let Some(handle) = self.open.read().await.get(&record.id) {
            return Ok(handle.clone());
        }

        // Opened and migrated without holding the lock; a concurrent first
        // open of the same tenant may win the insert below.
        let pool = match &self.storage {
            TenantStorage::Dir(dir) => {
                db::pool::open_file(&dir.join(format!("{}.db", record.database))).await?
            }
            TenantStorage::Memory => db::pool::open_memory().await?,
        };
        db::pool::migrate_tenant(&pool).await?;

        let mut open = self.open.write().await;
        let handle = open
            .entry(record.id)
            .or_insert_with(|| {
                tracing::debug!(
                    tenant_id = record.id,
                    database = %record.database,
                    "Tenant database opened"
                );
                TenantDb::new(record.id, &record.database, pool)
            })
            .clone();
        Ok(handle)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    without_port.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Bistro.Example.com:8080"), "bistro.example.com");
        assert_eq!(normalize_host("bistro.example.com"), "bistro.example.com");
        assert_eq!(normalize_host("  "), "");
    }

    #[tokio::test]
    async fn test_resolve_by_id_and_domain() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        registry.register(7, "Bistro", "bistro.example.com").await.unwrap();

        let by_id = registry.resolve_id(7).await.unwrap();
        assert_eq!(by_id.tenant_id(), 7);
        assert_eq!(by_id.database(), "tenant_7");

        let by_host = registry.resolve_domain("BISTRO.example.com:443").await.unwrap();
        assert_eq!(by_host.tenant_id(), 7);

        assert!(matches!(
            registry.resolve_id(8).await,
            Err(TenantError::NotFound(_))
        ));
        assert!(matches!(
            registry.resolve_domain("other.example.com").await,
            Err(TenantError::NotSelected)
        ));
    }

    #[tokio::test]
    async fn test_suspended_tenant_is_rejected() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        registry.register(3, "Closed", "closed.example.com").await.unwrap();
        registry.set_status(3, "suspended").await.unwrap();

        assert!(matches!(
            registry.resolve_id(3).await,
            Err(TenantError::Suspended(3))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_first_open_shares_one_database() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        db::tenants::insert_tenant(&registry.main, 4, "Terrace", "terrace.example.com", "tenant_4", 0)
            .await
            .unwrap();

        let (a, b) = tokio::join!(registry.resolve_id(4), registry.resolve_id(4));
        let (a, b) = (a.unwrap(), b.unwrap());

        let table_id = {
            let mut conn = a.acquire().await.unwrap();
            db::tables::insert_table(&mut conn, "Terrace 1", 0).await.unwrap()
        };
        let mut conn = b.acquire().await.unwrap();
        assert!(db::tables::exists_active(&mut conn, table_id).await.unwrap());

        drop(conn);
        let again = registry.resolve_id(4).await.unwrap();
        let mut conn = again.acquire().await.unwrap();
        assert!(db::tables::exists_active(&mut conn, table_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backed_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TenantRegistry::open(dir.path()).await.unwrap();
        registry.register(1, "Harbour", "harbour.example.com").await.unwrap();

        assert!(dir.path().join("main.db").exists());
        assert!(dir.path().join("tenants").join("tenant_1.db").exists());
        assert_eq!(registry.resolve_id(1).await.unwrap().tenant_id(), 1);
    }
}
