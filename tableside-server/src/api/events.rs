//! Table event ingestion
//!
//! Each endpoint records the raw event and runs the notification policy in
//! one transaction. A suppressed notification is not an error: the event
//! is still accepted and `notification_id` is `null`.

use axum::extract::State;
use axum::{Extension, Json, Router, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::{EventAccepted, TableInfo};
use shared::util::{millis_to_rfc3339, now_millis};
use sqlx::{Sqlite, Transaction};
use validator::{Validate, ValidationError};

use super::extract::ValidatedJson;
use crate::db::{self, StoreError, StoreResult, events::ValetRow};
use crate::notifications::{NotificationOutcome, SuppressReason, ValetInput, builders};
use crate::state::AppState;
use crate::tenant::TenantDb;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/waiter-call", post(waiter_call))
        .route("/api/v1/valet-request", post(valet_request))
        .route("/api/v1/table-notes", post(table_note))
}

/// Table reference as sent by storefronts: a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TableRef {
    Id(i64),
    Text(String),
}

impl TableRef {
    /// Numeric table id, if this references one
    pub fn id(&self) -> Option<i64> {
        match self {
            TableRef::Id(id) => Some(*id),
            TableRef::Text(text) => text.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            TableRef::Id(id) => id.to_string(),
            TableRef::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct WaiterCallRequest {
    #[validate(required)]
    pub table_id: Option<TableRef>,
    #[validate(required, length(min = 1, max = 500))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValetRequestBody {
    #[validate(required)]
    pub table_id: Option<TableRef>,
    #[serde(alias = "customer_name")]
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub car_make: Option<String>,
    #[validate(length(max = 20))]
    pub license_plate: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TableNoteRequest {
    #[validate(required)]
    pub table_id: Option<TableRef>,
    #[validate(required, length(min = 1, max = 500))]
    pub note: Option<String>,
    #[validate(required, custom(function = "validate_timestamp"))]
    pub timestamp: Option<String>,
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff]` (space or `T`) and plain dates
fn validate_timestamp(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let parses = chrono::DateTime::parse_from_rfc3339(value).is_ok()
        || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if parses {
        Ok(())
    } else {
        Err(ValidationError::new("timestamp").with_message("must be a valid date/time".into()))
    }
}

/// Active numeric table id, or 404
async fn require_table(
    state: &AppState,
    tenant: &TenantDb,
    table: &TableRef,
    failure: &'static str,
) -> Result<i64, AppError> {
    let not_found = || AppError::table_not_found(table.as_text());
    let Some(table_id) = table.id() else {
        return Err(not_found());
    };
    match state.directory.validate_table(tenant, table_id).await {
        Ok(true) => Ok(table_id),
        Ok(false) => Err(not_found()),
        Err(e) => Err(ingestion_failed(tenant, &table.as_text(), e, failure)),
    }
}

fn ingestion_failed(tenant: &TenantDb, table_id: &str, error: StoreError, failure: &'static str) -> AppError {
    tracing::error!(
        tenant_id = tenant.tenant_id(),
        table_id,
        error = %error,
        "{failure}"
    );
    AppError::internal(failure)
}

/// Commit the raw event with the policy outcome
///
/// A failed notification insert rolls the raw event back with it.
async fn finish(tx: Transaction<'static, Sqlite>, outcome: NotificationOutcome) -> StoreResult<NotificationOutcome> {
    if let NotificationOutcome::Failed(e) = outcome {
        tx.rollback().await?;
        return Err(e);
    }
    tx.commit().await?;
    Ok(outcome)
}

fn accepted(message: &str, id: i64, outcome: &NotificationOutcome, now: i64) -> (StatusCode, Json<EventAccepted>) {
    (
        StatusCode::CREATED,
        Json(EventAccepted {
            ok: true,
            message: message.to_string(),
            id,
            notification_id: outcome.notification_id(),
            created_at: millis_to_rfc3339(now),
        }),
    )
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation("Validation failed").with_detail(field, vec!["required"]))
}

// ── Waiter call ──

const WAITER_CALL_FAILED: &str = "Failed to process waiter call";

/// `POST /api/v1/waiter-call`
pub async fn waiter_call(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantDb>,
    ValidatedJson(req): ValidatedJson<WaiterCallRequest>,
) -> Result<(StatusCode, Json<EventAccepted>), AppError> {
    let table = required(req.table_id, "table_id")?;
    let message = required(req.message, "message")?;

    let table_id = require_table(&state, &tenant, &table, WAITER_CALL_FAILED).await?;
    let table_info = state.policy.resolve_table(&tenant, table_id).await;
    let now = now_millis();

    let (call_id, outcome) = record_waiter_call(&state, &tenant, table_id, table_info.as_ref(), &message, now)
        .await
        .map_err(|e| ingestion_failed(&tenant, &table.as_text(), e, WAITER_CALL_FAILED))?;

    Ok(accepted("Waiter called successfully", call_id, &outcome, now))
}

async fn record_waiter_call(
    state: &AppState,
    tenant: &TenantDb,
    table_id: i64,
    table: Option<&TableInfo>,
    message: &str,
    now: i64,
) -> StoreResult<(i64, NotificationOutcome)> {
    let mut tx = tenant.begin().await?;
    let call_id = db::events::insert_waiter_call(&mut tx, table_id, message, now).await?;
    let outcome = match table {
        Some(info) => {
            let draft = builders::waiter_call(info, message);
            state.policy.create_notification(&mut tx, tenant, &draft).await
        }
        None => NotificationOutcome::Suppressed(SuppressReason::TableNotFound),
    };
    Ok((call_id, finish(tx, outcome).await?))
}

// ── Valet request ──

const VALET_REQUEST_FAILED: &str = "Failed to process valet request";

/// `POST /api/v1/valet-request`
///
/// The table identifier is free-form and not validated against the
/// directory; the notification bypasses dedup and rate limiting.
pub async fn valet_request(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantDb>,
    ValidatedJson(req): ValidatedJson<ValetRequestBody>,
) -> Result<(StatusCode, Json<EventAccepted>), AppError> {
    let table = required(req.table_id.clone(), "table_id")?.as_text();
    let now = now_millis();

    let (request_id, outcome) = record_valet_request(&state, &tenant, &table, &req, now)
        .await
        .map_err(|e| ingestion_failed(&tenant, &table, e, VALET_REQUEST_FAILED))?;

    Ok(accepted("Valet request submitted successfully", request_id, &outcome, now))
}

async fn record_valet_request(
    state: &AppState,
    tenant: &TenantDb,
    table: &str,
    req: &ValetRequestBody,
    now: i64,
) -> StoreResult<(i64, NotificationOutcome)> {
    let mut tx = tenant.begin().await?;
    let row = ValetRow {
        table_id: table,
        customer_name: req.name.as_deref(),
        car_make: req.car_make.as_deref(),
        license_plate: req.license_plate.as_deref(),
    };
    let request_id = db::events::insert_valet_request(&mut tx, &row, now).await?;

    let draft = builders::valet_request(&ValetInput {
        table_id: table,
        name: req.name.as_deref(),
        car_make: req.car_make.as_deref(),
        license_plate: req.license_plate.as_deref(),
        request_id: req.request_id.as_deref(),
    });
    let outcome = state.policy.store_direct(&mut tx, tenant, &draft).await;
    Ok((request_id, finish(tx, outcome).await?))
}

// ── Table note ──

const TABLE_NOTE_FAILED: &str = "Failed to process table note";

/// `POST /api/v1/table-notes`
pub async fn table_note(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantDb>,
    ValidatedJson(req): ValidatedJson<TableNoteRequest>,
) -> Result<(StatusCode, Json<EventAccepted>), AppError> {
    let table = required(req.table_id, "table_id")?;
    let note = required(req.note, "note")?;
    let timestamp = required(req.timestamp, "timestamp")?;

    let table_id = require_table(&state, &tenant, &table, TABLE_NOTE_FAILED).await?;
    let table_info = state.policy.resolve_table(&tenant, table_id).await;
    let now = now_millis();

    let (note_id, outcome) = record_table_note(
        &state,
        &tenant,
        table_id,
        table_info.as_ref(),
        &note,
        &timestamp,
        now,
    )
    .await
    .map_err(|e| ingestion_failed(&tenant, &table.as_text(), e, TABLE_NOTE_FAILED))?;

    Ok(accepted("Note submitted successfully", note_id, &outcome, now))
}

async fn record_table_note(
    state: &AppState,
    tenant: &TenantDb,
    table_id: i64,
    table: Option<&TableInfo>,
    note: &str,
    timestamp: &str,
    now: i64,
) -> StoreResult<(i64, NotificationOutcome)> {
    let mut tx = tenant.begin().await?;
    let note_id = db::events::insert_table_note(&mut tx, table_id, note, timestamp, now).await?;
    let outcome = match table {
        Some(info) => {
            let draft = builders::table_note(info, note, timestamp);
            state.policy.create_notification(&mut tx, tenant, &draft).await
        }
        None => NotificationOutcome::Suppressed(SuppressReason::TableNotFound),
    };
    Ok((note_id, finish(tx, outcome).await?))
}
