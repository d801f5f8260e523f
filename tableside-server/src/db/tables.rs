//! Dining table reads for the table directory

use shared::models::TableInfo;
use sqlx::SqliteConnection;

use super::StoreResult;

/// Active status value of `tables.table_status`
pub const TABLE_ACTIVE: i64 = 1;

/// Fetch an active table
pub async fn find_active(conn: &mut SqliteConnection, table_id: i64) -> StoreResult<Option<TableInfo>> {
    let row = sqlx::query_as(
        r#"
        SELECT table_id, table_name, qr_code, min_capacity, max_capacity, is_joinable, priority
        FROM tables
        WHERE table_id = ? AND table_status = ?
        "#,
    )
    .bind(table_id)
    .bind(TABLE_ACTIVE)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Whether an active table with this id exists
pub async fn exists_active(conn: &mut SqliteConnection, table_id: i64) -> StoreResult<bool> {
    let (exists,): (i64,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM tables WHERE table_id = ? AND table_status = ?)",
    )
    .bind(table_id)
    .bind(TABLE_ACTIVE)
    .fetch_one(conn)
    .await?;
    Ok(exists != 0)
}

/// Insert an active table and return its id
pub async fn insert_table(conn: &mut SqliteConnection, table_name: &str, now: i64) -> StoreResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO tables (table_name, table_status, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING table_id
        "#,
    )
    .bind(table_name)
    .bind(TABLE_ACTIVE)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Set `table_status` (0 = inactive)
pub async fn set_status(conn: &mut SqliteConnection, table_id: i64, status: i64, now: i64) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE tables SET table_status = ?, updated_at = ? WHERE table_id = ?")
        .bind(status)
        .bind(now)
        .bind(table_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
