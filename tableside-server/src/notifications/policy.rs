//! Create-or-suppress policy for staff notifications
//!
//! Order of checks: duplicate window, then per-table rate limit, then
//! insert. Both checks read before the insert without a lock, so two
//! concurrent identical events can both pass; at most a handful of extra
//! notifications get through under that race.

use std::time::Duration;

use shared::models::{NewNotification, Notification, TableInfo};
use shared::util::now_millis;
use sqlx::SqliteConnection;

use super::builders::{self, ValetInput};
use crate::db::{self, StoreError, StoreResult};
use crate::directory::TableDirectory;
use crate::tenant::TenantDb;

/// Suppression windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyWindows {
    /// Same type and table within this window is a duplicate
    pub dedup_window: Duration,
    /// Window for the per-table rate limit
    pub rate_window: Duration,
    /// Notifications allowed per table within `rate_window`
    pub rate_limit: i64,
}

impl Default for PolicyWindows {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_secs(60),
            rate_window: Duration::from_secs(60 * 60),
            rate_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    Duplicate,
    RateLimited,
    TableNotFound,
}

impl SuppressReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::RateLimited => "rate_limited",
            Self::TableNotFound => "table_not_found",
        }
    }
}

/// Result of a policy decision
#[derive(Debug)]
pub enum NotificationOutcome {
    Created(Notification),
    Suppressed(SuppressReason),
    /// Store failure; already logged
    Failed(StoreError),
}

impl NotificationOutcome {
    /// The created notification, if any
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Created(n) => Some(n),
            _ => None,
        }
    }

    pub fn notification_id(&self) -> Option<i64> {
        self.notification().map(|n| n.id)
    }

    pub fn is_suppressed(&self, reason: SuppressReason) -> bool {
        matches!(self, Self::Suppressed(r) if *r == reason)
    }
}

#[derive(Clone)]
pub struct NotificationPolicy {
    windows: PolicyWindows,
    directory: TableDirectory,
}

impl NotificationPolicy {
    pub fn new(windows: PolicyWindows, directory: TableDirectory) -> Self {
        Self { windows, directory }
    }

    pub fn windows(&self) -> &PolicyWindows {
        &self.windows
    }

    pub fn directory(&self) -> &TableDirectory {
        &self.directory
    }

    /// Resolve table metadata, treating lookup failures as "unknown table"
    pub async fn resolve_table(&self, tenant: &TenantDb, table_id: i64) -> Option<TableInfo> {
        match self.directory.get_table_info(tenant, table_id).await {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                tracing::warn!(
                    tenant_id = tenant.tenant_id(),
                    table_id,
                    "Table not found for notification"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    tenant_id = tenant.tenant_id(),
                    table_id,
                    error = %e,
                    "Table lookup failed, treating table as unknown"
                );
                None
            }
        }
    }

    /// Apply dedup and rate limiting, then insert
    ///
    /// Runs on the caller's connection so it can share a transaction with
    /// the raw event insert.
    pub async fn create_notification(
        &self,
        conn: &mut SqliteConnection,
        tenant: &TenantDb,
        draft: &NewNotification,
    ) -> NotificationOutcome {
        tracing::debug!(
            tenant_id = tenant.tenant_id(),
            database = %tenant.database(),
            kind = %draft.kind,
            table_id = %draft.table_id,
            "Evaluating notification"
        );

        match self.try_create(conn, tenant, draft, now_millis()).await {
            Ok(Ok(notification)) => {
                log_created(&notification);
                NotificationOutcome::Created(notification)
            }
            Ok(Err(reason)) => NotificationOutcome::Suppressed(reason),
            Err(e) => failed(tenant, draft, e),
        }
    }

    async fn try_create(
        &self,
        conn: &mut SqliteConnection,
        tenant: &TenantDb,
        draft: &NewNotification,
        now: i64,
    ) -> StoreResult<Result<Notification, SuppressReason>> {
        let tenant_id = tenant.tenant_id();

        let dedup_since = now.saturating_sub(window_millis(self.windows.dedup_window));
        if db::notifications::exists_since(&mut *conn, tenant_id, draft.kind, &draft.table_id, dedup_since)
            .await?
        {
            tracing::info!(
                tenant_id,
                kind = %draft.kind,
                table_id = %draft.table_id,
                "Duplicate notification suppressed"
            );
            return Ok(Err(SuppressReason::Duplicate));
        }

        let rate_since = now.saturating_sub(window_millis(self.windows.rate_window));
        let recent = db::notifications::count_since(&mut *conn, tenant_id, &draft.table_id, rate_since).await?;
        if recent >= self.windows.rate_limit {
            tracing::warn!(
                tenant_id,
                table_id = %draft.table_id,
                recent,
                limit = self.windows.rate_limit,
                "Notification rate limit exceeded"
            );
            return Ok(Err(SuppressReason::RateLimited));
        }

        let notification = db::notifications::insert(conn, tenant_id, draft, now).await?;
        Ok(Ok(notification))
    }

    /// Insert without dedup or rate limiting (valet requests)
    pub async fn store_direct(
        &self,
        conn: &mut SqliteConnection,
        tenant: &TenantDb,
        draft: &NewNotification,
    ) -> NotificationOutcome {
        match db::notifications::insert(conn, tenant.tenant_id(), draft, now_millis()).await {
            Ok(notification) => {
                log_created(&notification);
                NotificationOutcome::Created(notification)
            }
            Err(e) => failed(tenant, draft, e),
        }
    }

    // ── Standalone constructors (own connection, no raw event) ──

    pub async fn create_waiter_call(
        &self,
        tenant: &TenantDb,
        table_id: i64,
        message: &str,
    ) -> NotificationOutcome {
        let Some(table) = self.resolve_table(tenant, table_id).await else {
            return NotificationOutcome::Suppressed(SuppressReason::TableNotFound);
        };
        let draft = builders::waiter_call(&table, message);
        self.with_connection(tenant, &draft, false).await
    }

    pub async fn create_table_note(
        &self,
        tenant: &TenantDb,
        table_id: i64,
        note: &str,
        timestamp: &str,
    ) -> NotificationOutcome {
        let Some(table) = self.resolve_table(tenant, table_id).await else {
            return NotificationOutcome::Suppressed(SuppressReason::TableNotFound);
        };
        let draft = builders::table_note(&table, note, timestamp);
        self.with_connection(tenant, &draft, false).await
    }

    pub async fn create_valet_request(
        &self,
        tenant: &TenantDb,
        input: &ValetInput<'_>,
    ) -> NotificationOutcome {
        let draft = builders::valet_request(input);
        self.with_connection(tenant, &draft, true).await
    }

    async fn with_connection(
        &self,
        tenant: &TenantDb,
        draft: &NewNotification,
        direct: bool,
    ) -> NotificationOutcome {
        let mut conn = match tenant.acquire().await {
            Ok(conn) => conn,
            Err(e) => return failed(tenant, draft, e),
        };
        if direct {
            self.store_direct(&mut conn, tenant, draft).await
        } else {
            self.create_notification(&mut conn, tenant, draft).await
        }
    }
}

fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}

fn log_created(notification: &Notification) {
    tracing::info!(
        tenant_id = notification.tenant_id,
        notification_id = notification.id,
        kind = %notification.kind,
        table_id = %notification.table_id,
        "Notification created"
    );
}

fn failed(tenant: &TenantDb, draft: &NewNotification, error: StoreError) -> NotificationOutcome {
    tracing::error!(
        tenant_id = tenant.tenant_id(),
        kind = %draft.kind,
        table_id = %draft.table_id,
        error = %error,
        "Failed to create notification"
    );
    NotificationOutcome::Failed(error)
}
