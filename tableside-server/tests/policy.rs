mod common;

use std::time::Duration;

use common::{add_table, setup, setup_with};
use serde_json::json;
use shared::models::{NewNotification, NotificationPriority, NotificationStatus, NotificationType, StatusCounts};
use shared::util::now_millis;
use tableside_server::Config;
use tableside_server::db;
use tableside_server::notifications::{NotificationOutcome, PolicyWindows, SuppressReason, ValetInput};
use tableside_server::tenant::TenantDb;

const MINUTE_MS: i64 = 60_000;

fn draft(kind: NotificationType, table_id: i64) -> NewNotification {
    NewNotification {
        kind,
        title: format!("Test - {table_id}"),
        message: "test".into(),
        table_id: table_id.to_string(),
        table_name: format!("Table {table_id}"),
        payload: json!({}),
        priority: NotificationPriority::Medium,
    }
}

/// Insert directly, bypassing the policy, at `now - age_ms`
async fn backdate(tenant: &TenantDb, kind: NotificationType, table_id: i64, age_ms: i64) -> i64 {
    let mut conn = tenant.acquire().await.unwrap();
    db::notifications::insert(
        &mut conn,
        tenant.tenant_id(),
        &draft(kind, table_id),
        now_millis() - age_ms,
    )
    .await
    .unwrap()
    .id
}

async fn counts(tenant: &TenantDb) -> StatusCounts {
    let mut conn = tenant.acquire().await.unwrap();
    db::notifications::counts_by_status(&mut conn, tenant.tenant_id())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_duplicate_within_window_is_suppressed() {
    let app = setup().await;
    let policy = &app.state.policy;

    let first = policy.create_waiter_call(&app.tenant, app.patio, "water").await;
    let created = first.notification().unwrap();
    assert_eq!(created.status, NotificationStatus::New);
    assert_eq!(created.tenant_id, app.tenant.tenant_id());

    let second = policy.create_waiter_call(&app.tenant, app.patio, "water again").await;
    assert!(second.is_suppressed(SuppressReason::Duplicate));

    // Another type for the same table is not a duplicate
    let note = policy
        .create_table_note(&app.tenant, app.patio, "allergy", "2024-05-01 19:00:00")
        .await;
    assert!(note.notification().is_some());

    // Same type, different table is not a duplicate either
    let other = policy.create_waiter_call(&app.tenant, app.bar, "water").await;
    assert!(other.notification().is_some());

    assert_eq!(counts(&app.tenant).await.total, 3);
}

#[tokio::test]
async fn test_duplicate_window_expires() {
    let app = setup().await;
    backdate(&app.tenant, NotificationType::WaiterCall, app.patio, 2 * MINUTE_MS).await;

    let outcome = app
        .state
        .policy
        .create_waiter_call(&app.tenant, app.patio, "water")
        .await;
    assert!(outcome.notification().is_some());
}

#[tokio::test]
async fn test_sixth_notification_in_an_hour_is_rate_limited() {
    let app = setup().await;
    let kinds = [
        NotificationType::TableNote,
        NotificationType::ValetRequest,
        NotificationType::TableNote,
        NotificationType::ValetRequest,
    ];
    for (i, kind) in kinds.into_iter().enumerate() {
        backdate(&app.tenant, kind, app.patio, (10 + i as i64) * MINUTE_MS).await;
    }

    // Fifth within the hour is still allowed
    let fifth = app
        .state
        .policy
        .create_waiter_call(&app.tenant, app.patio, "water")
        .await;
    assert!(fifth.notification().is_some());

    backdate(&app.tenant, NotificationType::WaiterCall, app.bar, 5 * MINUTE_MS).await;
    let sixth = app
        .state
        .policy
        .create_table_note(&app.tenant, app.patio, "one more", "2024-05-01")
        .await;
    assert!(sixth.is_suppressed(SuppressReason::RateLimited));
    assert_eq!(counts(&app.tenant).await.total, 6);
}

#[tokio::test]
async fn test_old_notifications_do_not_count_towards_rate_limit() {
    let app = setup().await;
    for i in 0..5 {
        backdate(&app.tenant, NotificationType::TableNote, app.patio, (61 + i) * MINUTE_MS).await;
    }

    let outcome = app
        .state
        .policy
        .create_waiter_call(&app.tenant, app.patio, "water")
        .await;
    assert!(outcome.notification().is_some());
}

#[tokio::test]
async fn test_windows_are_configurable() {
    let config = Config {
        policy: PolicyWindows {
            dedup_window: Duration::ZERO,
            rate_window: Duration::from_secs(3600),
            rate_limit: 2,
        },
        ..Config::default()
    };
    let app = setup_with(config).await;
    backdate(&app.tenant, NotificationType::WaiterCall, app.patio, 1).await;

    let second = app
        .state
        .policy
        .create_waiter_call(&app.tenant, app.patio, "water")
        .await;
    assert!(second.notification().is_some());

    let third = app
        .state
        .policy
        .create_table_note(&app.tenant, app.patio, "note", "2024-05-01")
        .await;
    assert!(third.is_suppressed(SuppressReason::RateLimited));
}

#[tokio::test]
async fn test_unresolvable_table_stores_nothing() {
    let app = setup().await;
    let policy = &app.state.policy;

    let call = policy.create_waiter_call(&app.tenant, 999, "water").await;
    assert!(call.is_suppressed(SuppressReason::TableNotFound));

    let note = policy
        .create_table_note(&app.tenant, 999, "note", "2024-05-01")
        .await;
    assert!(note.is_suppressed(SuppressReason::TableNotFound));

    assert_eq!(counts(&app.tenant).await, StatusCounts::default());
}

#[tokio::test]
async fn test_valet_bypasses_dedup_and_rate_limit() {
    let app = setup().await;
    for i in 0..5 {
        backdate(&app.tenant, NotificationType::TableNote, 7, (10 + i) * MINUTE_MS).await;
    }

    let input = ValetInput {
        table_id: "Table 7",
        name: Some("Ana"),
        ..Default::default()
    };
    for _ in 0..2 {
        let outcome = app.state.policy.create_valet_request(&app.tenant, &input).await;
        let created = outcome.notification().unwrap();
        assert_eq!(created.table_id, "7");
        assert_eq!(created.table_name, "Table 7");
        assert_eq!(created.kind, NotificationType::ValetRequest);
    }
    assert_eq!(counts(&app.tenant).await.total, 7);
}

#[tokio::test]
async fn test_counts_by_status() {
    let app = setup().await;
    let statuses = [
        NotificationStatus::New,
        NotificationStatus::New,
        NotificationStatus::Seen,
        NotificationStatus::Resolved,
    ];
    for (i, status) in statuses.into_iter().enumerate() {
        let id = backdate(&app.tenant, NotificationType::TableNote, i as i64 + 10, MINUTE_MS).await;
        let mut conn = app.tenant.acquire().await.unwrap();
        let updated = db::notifications::update_status(
            &mut conn,
            app.tenant.tenant_id(),
            id,
            status,
            None,
            now_millis(),
        )
        .await
        .unwrap();
        assert_eq!(updated.map(|n| n.status), Some(status));
    }

    assert_eq!(
        counts(&app.tenant).await,
        StatusCounts {
            new: 2,
            seen: 1,
            in_progress: 0,
            resolved: 1,
            total: 4,
        }
    );
}

#[tokio::test]
async fn test_dedup_is_per_tenant() {
    let app = setup().await;
    let other = app
        .state
        .tenants
        .register(2, "Harbour", "harbour.example.com")
        .await
        .unwrap();
    let other_table = add_table(&other, "Dock 1").await;
    assert_eq!(other_table, app.patio);

    let policy = &app.state.policy;
    let a = policy.create_waiter_call(&app.tenant, app.patio, "water").await;
    let b = policy.create_waiter_call(&other, other_table, "water").await;

    assert!(a.notification().is_some());
    let b = b.notification().unwrap();
    assert_eq!(b.tenant_id, 2);
    assert_eq!(b.title, "Waiter Call - Dock 1");
    assert_eq!(counts(&app.tenant).await.total, 1);
    assert_eq!(counts(&other).await.total, 1);
}

#[tokio::test]
async fn test_failed_outcome_carries_no_notification() {
    let outcome = NotificationOutcome::Failed(db::StoreError::Corrupt("bad row".into()));
    assert!(outcome.notification().is_none());
    assert_eq!(outcome.notification_id(), None);
}
