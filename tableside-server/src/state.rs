//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::db::StoreResult;
use crate::directory::TableDirectory;
use crate::notifications::NotificationPolicy;
use crate::tenant::TenantRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tenants: TenantRegistry,
    pub directory: TableDirectory,
    pub policy: NotificationPolicy,
}

impl AppState {
    /// File-backed state rooted at `config.data_dir`
    pub async fn new(config: Config) -> StoreResult<Self> {
        let tenants = TenantRegistry::open(&config.data_dir).await?;
        Ok(Self::with_registry(config, tenants))
    }

    /// State over in-memory databases
    pub async fn in_memory(config: Config) -> StoreResult<Self> {
        let tenants = TenantRegistry::in_memory().await?;
        Ok(Self::with_registry(config, tenants))
    }

    pub fn with_registry(config: Config, tenants: TenantRegistry) -> Self {
        let directory = TableDirectory::sql(config.table_cache_ttl());
        let policy = NotificationPolicy::new(config.policy, directory.clone());
        Self {
            config: Arc::new(config),
            tenants,
            directory,
            policy,
        }
    }
}
