//! Service-layer error
//!
//! Bridges store and tenant errors into [`AppError`] so handlers can use
//! `?` on both.

use axum::response::IntoResponse;
use shared::error::AppError;

use crate::db::StoreError;
use crate::tenant::TenantError;

#[derive(Debug)]
pub enum ServiceError {
    /// Store or infrastructure failure (logged, reported as a generic 500)
    Store(StoreError),
    /// Business-rule error passed through to the client
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Store(e.into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<TenantError> for ServiceError {
    fn from(e: TenantError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(store_err) => store_err.into(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
