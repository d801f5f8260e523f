//! Shared setup for integration tests: in-memory databases, one tenant
//! with a couple of tables, and request helpers for the router.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use tableside_server::db;
use tableside_server::tenant::TenantDb;
use tableside_server::{AppState, Config, api};

pub const TENANT_ID: i64 = 1;
pub const TENANT_DOMAIN: &str = "bistro.example.com";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub tenant: TenantDb,
    /// "Patio 1"
    pub patio: i64,
    /// "Bar 2"
    pub bar: i64,
}

pub async fn setup() -> TestApp {
    setup_with(Config::default()).await
}

pub async fn setup_with(config: Config) -> TestApp {
    let state = AppState::in_memory(config).await.unwrap();
    let tenant = state
        .tenants
        .register(TENANT_ID, "Bistro", TENANT_DOMAIN)
        .await
        .unwrap();
    let patio = add_table(&tenant, "Patio 1").await;
    let bar = add_table(&tenant, "Bar 2").await;
    let router = api::create_router(state.clone());

    TestApp {
        state,
        router,
        tenant,
        patio,
        bar,
    }
}

pub async fn add_table(tenant: &TenantDb, name: &str) -> i64 {
    let mut conn = tenant.acquire().await.unwrap();
    db::tables::insert_table(&mut conn, name, shared::util::now_millis())
        .await
        .unwrap()
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, Some(TENANT_ID), body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("PATCH", uri, Some(TENANT_ID), body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-tenant-id", TENANT_ID.to_string())
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Rows in a raw event table (`waiter_calls`, `valet_requests`, `table_notes`)
    pub async fn event_rows(&self, table: &str) -> i64 {
        let mut conn = self.tenant.acquire().await.unwrap();
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        count
    }
}

pub fn json_request(method: &str, uri: &str, tenant: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(id) = tenant {
        builder = builder.header("x-tenant-id", id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
