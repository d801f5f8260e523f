//! SQLite pool construction

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use super::StoreResult;

const MAX_CONNECTIONS: u32 = 8;

/// Open (creating if missing) a file-backed database
pub async fn open_file(path: &Path) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open a private in-memory database
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn open_memory() -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Apply the main-database migrations (tenant directory)
pub async fn migrate_main(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::migrate!("./migrations/main").run(pool).await?;
    Ok(())
}

/// Apply the per-tenant migrations
pub async fn migrate_tenant(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::migrate!("./migrations/tenant").run(pool).await?;
    Ok(())
}
