//! Notification store
//!
//! Every query is scoped by `tenant_id` in addition to living in the
//! tenant's own database.

use shared::models::{
    NewNotification, Notification, NotificationStatus, NotificationType, Pagination, StatusCounts,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{StoreError, StoreResult};

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 50;

const SELECT_COLUMNS: &str = "id, tenant_id, type, title, message, table_id, table_name, \
     payload, status, priority, seen_at, acted_by, acted_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    tenant_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    message: String,
    table_id: String,
    table_name: String,
    payload: String,
    status: String,
    priority: String,
    seen_at: Option<i64>,
    acted_by: Option<i64>,
    acted_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt =
            move |e: shared::models::UnknownVariant| StoreError::Corrupt(format!("notification {id}: {e}"));
        Ok(Notification {
            id: row.id,
            tenant_id: row.tenant_id,
            kind: row.kind.parse().map_err(corrupt)?,
            title: row.title,
            message: row.message,
            table_id: row.table_id,
            table_name: row.table_name,
            payload: serde_json::from_str(&row.payload)?,
            status: row.status.parse().map_err(corrupt)?,
            priority: row.priority.parse().map_err(corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            seen_at: row.seen_at,
            acted_by: row.acted_by,
            acted_at: row.acted_at,
        })
    }
}

/// Status filter for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(NotificationStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub status: StatusFilter,
    pub kind: Option<NotificationType>,
}

/// One page of a listing plus its position
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub pagination: Pagination,
}

/// Whether a notification of `kind` for `table_id` was created at or after `since`
pub async fn exists_since(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    kind: NotificationType,
    table_id: &str,
    since: i64,
) -> StoreResult<bool> {
    let (exists,): (i64,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM notifications
            WHERE tenant_id = ? AND type = ? AND table_id = ? AND created_at >= ?
        )
        "#,
    )
    .bind(tenant_id)
    .bind(kind.as_str())
    .bind(table_id)
    .bind(since)
    .fetch_one(conn)
    .await?;
    Ok(exists != 0)
}

/// Number of notifications of any type for `table_id` created at or after `since`
pub async fn count_since(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    table_id: &str,
    since: i64,
) -> StoreResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notifications WHERE tenant_id = ? AND table_id = ? AND created_at >= ?",
    )
    .bind(tenant_id)
    .bind(table_id)
    .bind(since)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Insert a notification with status `new`, timestamped `now`
pub async fn insert(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    draft: &NewNotification,
    now: i64,
) -> StoreResult<Notification> {
    let payload = serde_json::to_string(&draft.payload)?;
    let sql = format!(
        r#"
        INSERT INTO notifications (
            tenant_id, type, title, message, table_id, table_name,
            payload, status, priority, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {SELECT_COLUMNS}
        "#
    );
    let row: NotificationRow = sqlx::query_as(&sql)
        .bind(tenant_id)
        .bind(draft.kind.as_str())
        .bind(&draft.title)
        .bind(&draft.message)
        .bind(&draft.table_id)
        .bind(&draft.table_name)
        .bind(payload)
        .bind(NotificationStatus::New.as_str())
        .bind(draft.priority.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await?;
    row.try_into()
}

/// Per-status counts for the tenant; statuses with no rows count as zero
pub async fn counts_by_status(conn: &mut SqliteConnection, tenant_id: i64) -> StoreResult<StatusCounts> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM notifications WHERE tenant_id = ? GROUP BY status",
    )
    .bind(tenant_id)
    .fetch_all(conn)
    .await?;

    let mut counts = StatusCounts::default();
    for (status, n) in rows {
        let status: NotificationStatus = status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("status count: {e}")))?;
        counts.add(status, n);
    }
    Ok(counts)
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, tenant_id: i64, filter: &ListFilter) {
    query.push(" WHERE tenant_id = ").push_bind(tenant_id);
    if let StatusFilter::Only(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(kind) = filter.kind {
        query.push(" AND type = ").push_bind(kind.as_str());
    }
}

/// Newest-first page of notifications
///
/// `limit` defaults to [`DEFAULT_LIST_LIMIT`] and is clamped to `1..=MAX_LIST_LIMIT`;
/// `page` starts at 1.
pub async fn list(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    filter: &ListFilter,
    limit: Option<i64>,
    page: Option<i64>,
) -> StoreResult<NotificationPage> {
    let per_page = clamp_limit(limit);
    let page = page.unwrap_or(1).max(1);

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM notifications");
    push_filter(&mut count, tenant_id, filter);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {SELECT_COLUMNS} FROM notifications"));
    push_filter(&mut select, tenant_id, filter);
    select
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(per_page)
        .push(" OFFSET ")
        .push_bind((page - 1).saturating_mul(per_page));
    let rows = select.build_query_as::<NotificationRow>().fetch_all(&mut *conn).await?;

    Ok(NotificationPage {
        items: rows.into_iter().map(Notification::try_from).collect::<Result<Vec<_>, _>>()?,
        pagination: Pagination::new(page, per_page, total),
    })
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Set a notification's status and record who acted; `None` when no such
/// notification exists
///
/// `seen_at` is stamped only by a move to `seen`. No ordering between
/// statuses is enforced here.
pub async fn update_status(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    id: i64,
    status: NotificationStatus,
    acted_by: Option<i64>,
    now: i64,
) -> StoreResult<Option<Notification>> {
    let seen_at = (status == NotificationStatus::Seen).then_some(now);
    let sql = format!(
        r#"
        UPDATE notifications
        SET status = ?, seen_at = COALESCE(?, seen_at), acted_by = ?, acted_at = ?, updated_at = ?
        WHERE tenant_id = ? AND id = ?
        RETURNING {SELECT_COLUMNS}
        "#
    );
    let row: Option<NotificationRow> = sqlx::query_as(&sql)
        .bind(status.as_str())
        .bind(seen_at)
        .bind(acted_by)
        .bind(now)
        .bind(now)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(Notification::try_from).transpose()
}

/// Move every `new` notification of the tenant to `seen`
pub async fn mark_all_seen(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    acted_by: Option<i64>,
    now: i64,
) -> StoreResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET status = ?, seen_at = ?, acted_by = ?, acted_at = ?, updated_at = ?
        WHERE tenant_id = ? AND status = ?
        "#,
    )
    .bind(NotificationStatus::Seen.as_str())
    .bind(now)
    .bind(acted_by)
    .bind(now)
    .bind(now)
    .bind(tenant_id)
    .bind(NotificationStatus::New.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
