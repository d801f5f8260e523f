//! Notification Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of staff notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    WaiterCall,
    ValetRequest,
    TableNote,
}

impl NotificationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaiterCall => "waiter_call",
            Self::ValetRequest => "valet_request",
            Self::TableNote => "table_note",
        }
    }
}

/// Notification lifecycle: `new → seen → in_progress → resolved`
///
/// Transitions are driven by staff actions. Nothing moves a notification
/// back to `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    New,
    Seen,
    InProgress,
    Resolved,
}

impl NotificationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Seen => "seen",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    /// Whether staff may set this status through the API.
    ///
    /// Ordering between `seen`, `in_progress` and `resolved` is a convention
    /// only; the one hard rule is that `new` is never a target.
    pub const fn is_staff_target(&self) -> bool {
        !matches!(self, Self::New)
    }
}

/// Display priority (styling/ordering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
}

impl NotificationPriority {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
        }
    }
}

/// Error returned when a stored string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! impl_str_enum {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_str_enum!(
    NotificationType,
    "notification type",
    [
        NotificationType::WaiterCall,
        NotificationType::ValetRequest,
        NotificationType::TableNote,
    ]
);
impl_str_enum!(
    NotificationStatus,
    "notification status",
    [
        NotificationStatus::New,
        NotificationStatus::Seen,
        NotificationStatus::InProgress,
        NotificationStatus::Resolved,
    ]
);
impl_str_enum!(
    NotificationPriority,
    "notification priority",
    [NotificationPriority::Low, NotificationPriority::Medium]
);

/// Stored notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub tenant_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    /// Foreign table identifier; free-form for valet requests
    pub table_id: String,
    /// Table name as it was when the notification was created
    pub table_name: String,
    pub payload: serde_json::Value,
    pub status: NotificationStatus,
    pub priority: NotificationPriority,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
    /// Unix millis of the last move to `seen`
    #[serde(default)]
    pub seen_at: Option<i64>,
    /// Staff member behind the last status change
    #[serde(default)]
    pub acted_by: Option<i64>,
    /// Unix millis of the last status change
    #[serde(default)]
    pub acted_at: Option<i64>,
}

/// Notification ready to be stored (id, tenant and timestamps assigned on insert)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub table_id: String,
    pub table_name: String,
    pub payload: serde_json::Value,
    pub priority: NotificationPriority,
}

/// Per-status aggregate for the badge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub new: i64,
    pub seen: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub total: i64,
}

impl StatusCounts {
    /// Add `n` notifications with the given status
    pub fn add(&mut self, status: NotificationStatus, n: i64) {
        match status {
            NotificationStatus::New => self.new += n,
            NotificationStatus::Seen => self.seen += n,
            NotificationStatus::InProgress => self.in_progress += n,
            NotificationStatus::Resolved => self.resolved += n,
        }
        self.total += n;
    }
}

// ── Feed DTOs ──

/// Page position of a feed listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(current_page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let last_page = ((total + per_page - 1) / per_page).max(1);
        Self {
            current_page,
            per_page,
            total,
            last_page,
            has_more: current_page < last_page,
        }
    }
}

/// `GET /admin/notifications-api/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationList {
    pub ok: bool,
    pub items: Vec<Notification>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// `GET /admin/notifications-api/count`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCountResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// `PATCH /admin/notifications-api/{id}` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: NotificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acted_by: Option<i64>,
}

/// `PATCH /admin/notifications-api/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdated {
    pub ok: bool,
    pub id: i64,
    pub status: NotificationStatus,
    #[serde(default)]
    pub seen_at: Option<i64>,
    #[serde(default)]
    pub acted_by: Option<i64>,
    #[serde(default)]
    pub acted_at: Option<i64>,
}

/// `PATCH /admin/notifications-api/mark-all-seen` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllSeen {
    pub ok: bool,
    pub updated: u64,
    pub acted_by: Option<i64>,
    /// Unix millis
    pub acted_at: i64,
}
