//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotificationNotFound | Self::TableNotFound => {
                StatusCode::NOT_FOUND
            }

            // 403 Forbidden
            Self::TenantSuspended => StatusCode::FORBIDDEN,

            // 422 Unprocessable Entity
            Self::InvalidStatusTransition => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation, missing tenant context)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
