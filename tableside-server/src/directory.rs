//! Table directory: resolves table metadata for a tenant
//!
//! Positive lookups are cached per `(tenant_id, table_id)` for a fixed TTL.
//! Misses are not cached, so a table created after a failed lookup is seen
//! on the next call. Table mutations must call [`TableDirectory::clear_table_cache`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::models::TableInfo;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::db::{self, StoreResult};
use crate::tenant::TenantDb;

pub const DEFAULT_TABLE_CACHE_TTL: Duration = Duration::from_secs(300);

/// Backing lookup for the directory
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Active table by id
    async fn find_active(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<Option<TableInfo>>;

    /// Whether an active table exists
    async fn exists_active(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<bool>;
}

/// [`TableSource`] reading the tenant's `tables` table
pub struct SqlTableSource;

#[async_trait]
impl TableSource for SqlTableSource {
    async fn find_active(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<Option<TableInfo>> {
        let mut conn = tenant.acquire().await?;
        db::tables::find_active(&mut conn, table_id).await
    }

    async fn exists_active(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<bool> {
        let mut conn = tenant.acquire().await?;
        db::tables::exists_active(&mut conn, table_id).await
    }
}

struct CacheEntry {
    info: TableInfo,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct TableDirectory {
    source: Arc<dyn TableSource>,
    ttl: Duration,
    entries: Arc<RwLock<HashMap<(i64, i64), CacheEntry>>>,
}

impl TableDirectory {
    pub fn new(source: Arc<dyn TableSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Directory over the tenant databases
    pub fn sql(ttl: Duration) -> Self {
        Self::new(Arc::new(SqlTableSource), ttl)
    }

    /// Active table info, served from cache while fresh
    pub async fn get_table_info(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<Option<TableInfo>> {
        let key = (tenant.tenant_id(), table_id);
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key)
                && entry.expires_at > Instant::now()
            {
                return Ok(Some(entry.info.clone()));
            }
        }

        let info = self.source.find_active(tenant, table_id).await?;
        if let Some(info) = &info {
            self.entries.write().await.insert(
                key,
                CacheEntry {
                    info: info.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
        Ok(info)
    }

    pub async fn get_table_name(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<Option<String>> {
        Ok(self
            .get_table_info(tenant, table_id)
            .await?
            .map(|info| info.table_name))
    }

    /// Existence and active check against the source, bypassing the cache
    pub async fn validate_table(&self, tenant: &TenantDb, table_id: i64) -> StoreResult<bool> {
        self.source.exists_active(tenant, table_id).await
    }

    pub async fn clear_table_cache(&self, tenant: &TenantDb, table_id: i64) {
        self.entries
            .write()
            .await
            .remove(&(tenant.tenant_id(), table_id));
    }

    /// Drop expired entries
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::tenant::TenantRegistry;

    /// Source that serves one table and counts lookups
    struct CountingSource {
        lookups: AtomicUsize,
        table: TableInfo,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                lookups: AtomicUsize::new(0),
                table: TableInfo {
                    table_id: 5,
                    table_name: "Patio 1".into(),
                    qr_code: None,
                    min_capacity: 2,
                    max_capacity: 4,
                    is_joinable: true,
                    priority: 0,
                },
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TableSource for CountingSource {
        async fn find_active(&self, _tenant: &TenantDb, table_id: i64) -> StoreResult<Option<TableInfo>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok((table_id == self.table.table_id).then(|| self.table.clone()))
        }

        async fn exists_active(&self, _tenant: &TenantDb, table_id: i64) -> StoreResult<bool> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(table_id == self.table.table_id)
        }
    }

    async fn tenant(registry: &TenantRegistry, id: i64) -> TenantDb {
        registry
            .register(id, "Test", &format!("t{id}.example.com"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_second_lookup_is_cached() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        let t = tenant(&registry, 1).await;
        let source = Arc::new(CountingSource::new());
        let directory = TableDirectory::new(source.clone(), DEFAULT_TABLE_CACHE_TTL);

        let first = directory.get_table_info(&t, 5).await.unwrap();
        let second = directory.get_table_info(&t, 5).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.unwrap().table_name, "Patio 1");
        assert_eq!(source.lookups(), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        let t = tenant(&registry, 1).await;
        let source = Arc::new(CountingSource::new());
        let directory = TableDirectory::new(source.clone(), DEFAULT_TABLE_CACHE_TTL);

        assert!(directory.get_table_info(&t, 99).await.unwrap().is_none());
        assert!(directory.get_table_info(&t, 99).await.unwrap().is_none());
        assert_eq!(source.lookups(), 2);
    }

    #[tokio::test]
    async fn test_cache_is_per_tenant() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        let a = tenant(&registry, 1).await;
        let b = tenant(&registry, 2).await;
        let source = Arc::new(CountingSource::new());
        let directory = TableDirectory::new(source.clone(), DEFAULT_TABLE_CACHE_TTL);

        directory.get_table_info(&a, 5).await.unwrap();
        directory.get_table_info(&b, 5).await.unwrap();
        assert_eq!(source.lookups(), 2);
    }

    #[tokio::test]
    async fn test_clear_and_expiry() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        let t = tenant(&registry, 1).await;
        let source = Arc::new(CountingSource::new());
        let directory = TableDirectory::new(source.clone(), DEFAULT_TABLE_CACHE_TTL);

        directory.get_table_info(&t, 5).await.unwrap();
        directory.clear_table_cache(&t, 5).await;
        directory.get_table_info(&t, 5).await.unwrap();
        assert_eq!(source.lookups(), 2);

        let short = TableDirectory::new(source.clone(), Duration::ZERO);
        short.get_table_info(&t, 5).await.unwrap();
        assert_eq!(short.purge_expired().await, 1);
        short.get_table_info(&t, 5).await.unwrap();
        assert_eq!(source.lookups(), 4);
    }

    #[tokio::test]
    async fn test_validate_bypasses_cache() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        let t = tenant(&registry, 1).await;
        let source = Arc::new(CountingSource::new());
        let directory = TableDirectory::new(source.clone(), DEFAULT_TABLE_CACHE_TTL);

        assert!(directory.validate_table(&t, 5).await.unwrap());
        assert!(directory.validate_table(&t, 5).await.unwrap());
        assert!(!directory.validate_table(&t, 6).await.unwrap());
        assert_eq!(source.lookups(), 3);
        assert_eq!(
            directory.get_table_name(&t, 5).await.unwrap().as_deref(),
            Some("Patio 1")
        );
    }

    #[tokio::test]
    async fn test_sql_source_reads_active_tables() {
        let registry = TenantRegistry::in_memory().await.unwrap();
        let t = tenant(&registry, 1).await;
        let now = shared::util::now_millis();
        let (active, inactive) = {
            let mut conn = t.acquire().await.unwrap();
            let active = db::tables::insert_table(&mut conn, "Window 2", now).await.unwrap();
            let inactive = db::tables::insert_table(&mut conn, "Closed", now).await.unwrap();
            db::tables::set_status(&mut conn, inactive, 0, now).await.unwrap();
            (active, inactive)
        };

        let directory = TableDirectory::sql(DEFAULT_TABLE_CACHE_TTL);
        let info = directory.get_table_info(&t, active).await.unwrap().unwrap();
        assert_eq!(info.table_name, "Window 2");
        assert!(directory.get_table_info(&t, inactive).await.unwrap().is_none());
        assert!(!directory.validate_table(&t, inactive).await.unwrap());
    }
}
