//! Admin notification feed
//!
//! Staff read the newest notifications, poll the per-status counts and move
//! notifications forward through `seen → in_progress → resolved`.

use axum::extract::{Path, Query};
use axum::{Extension, Json, Router, routing::{get, patch}};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    MarkAllSeen, NotificationCountResponse, NotificationList, NotificationStatus, NotificationType,
    StatusUpdated,
};
use shared::util::now_millis;
use validator::Validate;

use super::extract::ValidatedJson;
use crate::db::notifications::{self as store, ListFilter, StatusFilter};
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::tenant::TenantDb;

const BASE: &str = "/admin/notifications-api";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE, get(list))
        .route(&format!("{BASE}/"), get(list))
        .route(&format!("{BASE}/count"), get(count))
        .route(&format!("{BASE}/mark-all-seen"), patch(mark_all_seen))
        .route(&format!("{BASE}/{{id}}"), patch(update_status))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `new` (default), `all`, or a specific status
    pub status: Option<String>,
    /// Notification type; all types when absent
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Default 20, capped at 50; unparsable values fall back to the default
    pub limit: Option<String>,
    /// 1-based; unparsable values fall back to the first page
    pub page: Option<String>,
}

fn parse_filter(status: Option<&str>) -> Result<StatusFilter, AppError> {
    match status.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(StatusFilter::Only(NotificationStatus::New)),
        Some("all") => Ok(StatusFilter::All),
        Some(other) => other.parse().map(StatusFilter::Only).map_err(|_| {
            AppError::validation("Unknown status filter").with_detail("status", other.to_string())
        }),
    }
}

fn parse_kind(kind: Option<&str>) -> Result<Option<NotificationType>, AppError> {
    match kind.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(other) => other.parse().map(Some).map_err(|_| {
            AppError::validation("Unknown notification type").with_detail("type", other.to_string())
        }),
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// `GET /admin/notifications-api/`
pub async fn list(
    Extension(tenant): Extension<TenantDb>,
    Query(query): Query<ListQuery>,
) -> ServiceResult<Json<NotificationList>> {
    let filter = ListFilter {
        status: parse_filter(query.status.as_deref())?,
        kind: parse_kind(query.kind.as_deref())?,
    };
    let limit = parse_number(query.limit.as_deref());
    let page = parse_number(query.page.as_deref());

    let mut conn = tenant.acquire().await?;
    let page = store::list(&mut conn, tenant.tenant_id(), &filter, limit, page).await?;
    Ok(Json(NotificationList {
        ok: true,
        items: page.items,
        pagination: page.pagination,
    }))
}

/// `GET /admin/notifications-api/count`
pub async fn count(Extension(tenant): Extension<TenantDb>) -> ServiceResult<Json<NotificationCountResponse>> {
    let mut conn = tenant.acquire().await?;
    let counts = store::counts_by_status(&mut conn, tenant.tenant_id()).await?;
    Ok(Json(NotificationCountResponse { ok: true, counts }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    #[validate(required)]
    pub status: Option<String>,
    /// Staff member acting; recorded as-is
    pub acted_by: Option<i64>,
}

/// `PATCH /admin/notifications-api/{id}`
///
/// `new` is never a valid target. Ordering among the other statuses is not
/// enforced.
pub async fn update_status(
    Extension(tenant): Extension<TenantDb>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<StatusUpdateRequest>,
) -> ServiceResult<Json<StatusUpdated>> {
    let raw = req.status.unwrap_or_default();
    let status: NotificationStatus = raw.parse().map_err(|_| {
        AppError::validation("Validation failed").with_detail("status", vec!["unknown status"])
    })?;
    if !status.is_staff_target() {
        return Err(AppError::new(ErrorCode::InvalidStatusTransition)
            .with_detail("status", status.as_str())
            .into());
    }

    let mut conn = tenant.acquire().await?;
    let Some(updated) =
        store::update_status(&mut conn, tenant.tenant_id(), id, status, req.acted_by, now_millis()).await?
    else {
        return Err(AppError::new(ErrorCode::NotificationNotFound)
            .with_detail("id", id)
            .into());
    };

    tracing::info!(
        tenant_id = tenant.tenant_id(),
        notification_id = id,
        status = %status,
        acted_by = ?req.acted_by,
        "Notification status updated"
    );
    Ok(Json(StatusUpdated {
        ok: true,
        id,
        status: updated.status,
        seen_at: updated.seen_at,
        acted_by: updated.acted_by,
        acted_at: updated.acted_at,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkAllSeenRequest {
    pub acted_by: Option<i64>,
}

/// `PATCH /admin/notifications-api/mark-all-seen`
pub async fn mark_all_seen(
    Extension(tenant): Extension<TenantDb>,
    ValidatedJson(req): ValidatedJson<MarkAllSeenRequest>,
) -> ServiceResult<Json<MarkAllSeen>> {
    let now = now_millis();
    let mut conn = tenant.acquire().await?;
    let updated = store::mark_all_seen(&mut conn, tenant.tenant_id(), req.acted_by, now).await?;
    tracing::info!(
        tenant_id = tenant.tenant_id(),
        updated,
        acted_by = ?req.acted_by,
        "Notifications marked as seen"
    );
    Ok(Json(MarkAllSeen {
        ok: true,
        updated,
        acted_by: req.acted_by,
        acted_at: now,
    }))
}
