mod common;

use common::{TestApp, setup, setup_with};
use tableside_server::Config;
use http::StatusCode;
use serde_json::{Value, json};

async fn call_waiter(app: &TestApp, table_id: i64, message: &str) -> i64 {
    let (status, body) = app
        .post(
            "/api/v1/waiter-call",
            json!({ "table_id": table_id, "message": message }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["notification_id"].as_i64().unwrap()
}

fn ids(list: &Value) -> Vec<i64> {
    list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_count_starts_at_zero() {
    let app = setup().await;
    let (status, body) = app.get("/admin/notifications-api/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "ok": true, "new": 0, "seen": 0, "in_progress": 0, "resolved": 0, "total": 0 })
    );
}

#[tokio::test]
async fn test_list_is_newest_first_and_defaults_to_new() {
    let app = setup().await;
    let first = call_waiter(&app, app.patio, "water").await;
    let second = call_waiter(&app, app.bar, "bill").await;

    let (status, list) = app.get("/admin/notifications-api/?_t=1700000000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["ok"], true);
    assert_eq!(ids(&list), vec![second, first]);

    // Without the trailing slash too
    let (status, list) = app.get("/admin/notifications-api?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&list), vec![second]);
}

#[tokio::test]
async fn test_mark_seen_moves_out_of_new() {
    let app = setup().await;
    let id = call_waiter(&app, app.patio, "water").await;
    call_waiter(&app, app.bar, "bill").await;

    let (status, body) = app
        .patch(
            &format!("/admin/notifications-api/{id}"),
            json!({ "status": "seen" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["id"], id);
    assert_eq!(body["status"], "seen");
    assert!(body["seen_at"].is_i64());
    assert!(body["acted_by"].is_null());

    let (_, counts) = app.get("/admin/notifications-api/count").await;
    assert_eq!(counts["new"], 1);
    assert_eq!(counts["seen"], 1);
    assert_eq!(counts["total"], 2);

    let (_, new_items) = app.get("/admin/notifications-api/").await;
    assert!(!ids(&new_items).contains(&id));

    let (_, seen_items) = app.get("/admin/notifications-api/?status=seen").await;
    assert_eq!(ids(&seen_items), vec![id]);

    let (_, all) = app.get("/admin/notifications-api/?status=all").await;
    assert_eq!(ids(&all).len(), 2);
}

#[tokio::test]
async fn test_status_can_move_forward_to_resolved() {
    let app = setup().await;
    let id = call_waiter(&app, app.patio, "water").await;
    let uri = format!("/admin/notifications-api/{id}");

    for status in ["seen", "in_progress", "resolved"] {
        let (code, body) = app.patch(&uri, json!({ "status": status })).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], status);
    }

    let (_, counts) = app.get("/admin/notifications-api/count").await;
    assert_eq!(counts["resolved"], 1);
    assert_eq!(counts["new"], 0);
}

#[tokio::test]
async fn test_status_back_to_new_is_rejected() {
    let app = setup().await;
    let id = call_waiter(&app, app.patio, "water").await;

    let (status, body) = app
        .patch(
            &format!("/admin/notifications-api/{id}"),
            json!({ "status": "new" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 4002);

    let (status, body) = app
        .patch(
            &format!("/admin/notifications-api/{id}"),
            json!({ "status": "archived" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_unknown_notification_is_not_found() {
    let app = setup().await;
    let (status, body) = app
        .patch("/admin/notifications-api/424242", json!({ "status": "seen" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn test_mark_all_seen() {
    let app = setup().await;
    call_waiter(&app, app.patio, "water").await;
    call_waiter(&app, app.bar, "bill").await;

    let (status, body) = app
        .patch("/admin/notifications-api/mark-all-seen", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["updated"], 2);
    assert!(body["acted_at"].is_i64());

    let (_, counts) = app.get("/admin/notifications-api/count").await;
    assert_eq!(counts["new"], 0);
    assert_eq!(counts["seen"], 2);

    let (_, body) = app
        .patch("/admin/notifications-api/mark-all-seen", json!({}))
        .await;
    assert_eq!(body["updated"], 0);
}

#[tokio::test]
async fn test_status_changes_record_who_acted() {
    let app = setup().await;
    let id = call_waiter(&app, app.patio, "water").await;
    let uri = format!("/admin/notifications-api/{id}");

    let (_, seen) = app.patch(&uri, json!({ "status": "seen", "acted_by": 7 })).await;
    assert_eq!(seen["acted_by"], 7);
    let seen_at = seen["seen_at"].as_i64().unwrap();
    assert_eq!(seen["acted_at"].as_i64(), Some(seen_at));

    let (status, resolved) = app
        .patch(&uri, json!({ "status": "resolved", "acted_by": 9 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["acted_by"], 9);
    assert_eq!(resolved["seen_at"].as_i64(), Some(seen_at));
    assert!(resolved["acted_at"].as_i64().unwrap() >= seen_at);

    let (_, list) = app.get("/admin/notifications-api/?status=resolved").await;
    assert_eq!(list["items"][0]["acted_by"], 9);
    assert_eq!(list["items"][0]["seen_at"].as_i64(), Some(seen_at));
}

#[tokio::test]
async fn test_mark_all_seen_records_actor() {
    let app = setup().await;
    let id = call_waiter(&app, app.patio, "water").await;

    let (_, body) = app
        .patch("/admin/notifications-api/mark-all-seen", json!({ "acted_by": 4 }))
        .await;
    assert_eq!(body["updated"], 1);
    assert_eq!(body["acted_by"], 4);

    let (_, list) = app.get("/admin/notifications-api/?status=seen").await;
    let item = &list["items"][0];
    assert_eq!(item["id"], id);
    assert_eq!(item["acted_by"], 4);
    assert_eq!(item["seen_at"], body["acted_at"]);
}

#[tokio::test]
async fn test_list_filters_by_type() {
    let app = setup().await;
    let call = call_waiter(&app, app.patio, "water").await;
    let (status, valet) = app
        .post(
            "/api/v1/valet-request",
            json!({ "table_id": "Table 12", "name": "Ana", "license_plate": "1234ABC" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let valet = valet["notification_id"].as_i64().unwrap();

    let (_, list) = app.get("/admin/notifications-api/?type=valet_request").await;
    assert_eq!(ids(&list), vec![valet]);

    let (_, list) = app
        .get("/admin/notifications-api/?status=all&type=waiter_call")
        .await;
    assert_eq!(ids(&list), vec![call]);

    let (status, body) = app.get("/admin/notifications-api/?type=order_ready").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_list_pagination() {
    let app = setup().await;
    let mut created = Vec::new();
    for name in ["Patio 3", "Patio 4", "Patio 5"] {
        let table = common::add_table(&app.tenant, name).await;
        created.push(call_waiter(&app, table, "water").await);
    }
    created.reverse();

    let (_, first) = app.get("/admin/notifications-api/?limit=2").await;
    assert_eq!(ids(&first), created[..2].to_vec());
    assert_eq!(
        first["pagination"],
        json!({ "current_page": 1, "per_page": 2, "total": 3, "last_page": 2, "has_more": true })
    );

    let (_, second) = app.get("/admin/notifications-api/?limit=2&page=2").await;
    assert_eq!(ids(&second), created[2..].to_vec());
    assert_eq!(second["pagination"]["has_more"], false);

    let (_, beyond) = app.get("/admin/notifications-api/?limit=2&page=9").await;
    assert!(ids(&beyond).is_empty());
}

#[tokio::test]
async fn test_feed_is_tenant_scoped() {
    let app = setup().await;
    call_waiter(&app, app.patio, "water").await;

    let other = app
        .state
        .tenants
        .register(2, "Harbour", "harbour.example.com")
        .await
        .unwrap();
    assert_eq!(other.tenant_id(), 2);

    let request = http::Request::builder()
        .uri("/admin/notifications-api/count")
        .header("x-tenant-id", "2")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, counts) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts["total"], 0);
}

#[tokio::test]
async fn test_stalled_request_times_out_with_408() {
    let app = setup_with(Config {
        request_timeout_ms: 50,
        ..Config::default()
    })
    .await;
    // Hold the tenant's only connection so the handler cannot proceed
    let held = app.tenant.acquire().await.unwrap();

    let (status, _) = app.get("/admin/notifications-api/count").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    drop(held);
    let (status, _) = app.get("/admin/notifications-api/count").await;
    assert_eq!(status, StatusCode::OK);
}
