//! Raw inbound event rows
//!
//! Each submission is recorded here whether or not the notification policy
//! produced a notification for it.

use sqlx::SqliteConnection;

use super::StoreResult;

pub async fn insert_waiter_call(
    conn: &mut SqliteConnection,
    table_id: i64,
    message: &str,
    now: i64,
) -> StoreResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO waiter_calls (table_id, message, status, created_at, updated_at)
        VALUES (?, ?, 'pending', ?, ?)
        RETURNING id
        "#,
    )
    .bind(table_id)
    .bind(message)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Valet request as submitted (table id kept verbatim)
#[derive(Debug, Clone, Default)]
pub struct ValetRow<'a> {
    pub table_id: &'a str,
    pub customer_name: Option<&'a str>,
    pub car_make: Option<&'a str>,
    pub license_plate: Option<&'a str>,
}

pub async fn insert_valet_request(
    conn: &mut SqliteConnection,
    row: &ValetRow<'_>,
    now: i64,
) -> StoreResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO valet_requests (
            table_id, customer_name, car_make, license_plate, status, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, 'pending', ?, ?)
        RETURNING id
        "#,
    )
    .bind(row.table_id)
    .bind(row.customer_name)
    .bind(row.car_make)
    .bind(row.license_plate)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn insert_table_note(
    conn: &mut SqliteConnection,
    table_id: i64,
    note: &str,
    timestamp: &str,
    now: i64,
) -> StoreResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO table_notes (table_id, note, timestamp, status, created_at, updated_at)
        VALUES (?, ?, ?, 'new', ?, ?)
        RETURNING id
        "#,
    )
    .bind(table_id)
    .bind(note)
    .bind(timestamp)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}
