//! Inbound table event responses

use serde::{Deserialize, Serialize};

/// Response for waiter-call, valet-request and table-note submissions
///
/// `id` is the raw event row; `notification_id` is `None` when no
/// notification was created for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAccepted {
    pub ok: bool,
    pub message: String,
    pub id: i64,
    pub notification_id: Option<i64>,
    /// ISO-8601
    pub created_at: String,
}
