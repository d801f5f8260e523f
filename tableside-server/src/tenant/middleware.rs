//! Tenant resolution middleware
//!
//! Resolves the request's tenant from `X-Tenant-Id`, falling back to the
//! `Host` header, and injects the [`TenantDb`](super::TenantDb) as a
//! request extension.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use super::{ResolvedTenant, TenantError};
use crate::state::AppState;

pub const TENANT_HEADER: &str = "x-tenant-id";

pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let explicit = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let host = headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let resolved = match (explicit, host) {
        (Some(raw), _) => match raw.parse::<i64>() {
            Ok(id) => state.tenants.resolve_id(id).await,
            Err(_) => Err(TenantError::NotFound(raw)),
        },
        (None, Some(host)) => state.tenants.resolve_domain(&host).await,
        (None, None) => Err(TenantError::NotSelected),
    };

    let tenant = match resolved {
        Ok(tenant) => tenant,
        Err(e) => {
            tracing::warn!(
                target: "security",
                method = %request.method(),
                path = %request.uri().path(),
                error = %e,
                "Tenant resolution failed"
            );
            return Err(e.into());
        }
    };

    tracing::info!(
        target: "audit",
        tenant_id = tenant.tenant_id(),
        database = %tenant.database(),
        method = %request.method(),
        path = %request.uri().path(),
        "Notification operation"
    );

    let marker = ResolvedTenant(tenant.tenant_id());
    request.extensions_mut().insert(tenant);
    let mut response = next.run(request).await;
    response.extensions_mut().insert(marker);
    Ok(response)
}
