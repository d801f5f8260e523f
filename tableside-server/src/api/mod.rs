//! HTTP API
//!
//! - `/health` (public)
//! - `/api/v1/*` table event ingestion (tenant-scoped)
//! - `/admin/notifications-api/*` staff feed (tenant-scoped)

pub mod events;
pub mod extract;
pub mod health;
pub mod notifications;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderValue, Request, StatusCode};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::middleware::logging_middleware;
use crate::state::AppState;
use crate::tenant;

/// UUID v4 request ids
#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Routes that require a resolved tenant
fn tenant_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(notifications::router())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            tenant::resolve_tenant,
        ))
}

/// Build the application with all middleware and state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(tenant_router(&state))
        // Innermost first: timeout, CORS, request logging, tracing
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        // Request id is assigned outermost so request logging can read it
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(XRequestId))
        .with_state(state)
}
