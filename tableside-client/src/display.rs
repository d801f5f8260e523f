//! Row text for the notification dropdown

use shared::models::{Notification, NotificationType};

/// Waiter-call messages that carry no information
const LEGACY_DEFAULT_MESSAGE: &str = "customer needs assistance";
const MINIMAL_MESSAGE: &str = ".";

/// Non-blank string field of the payload
fn payload_str<'a>(payload: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Body text shown under the table name
pub fn display_text(item: &Notification) -> String {
    let field = |key: &str| payload_str(&item.payload, key);

    match item.kind {
        NotificationType::TableNote => field("note").unwrap_or("(no note text)").to_string(),
        NotificationType::ValetRequest => {
            let name = field("name").unwrap_or("Guest");
            let plate = field("license_plate").unwrap_or("—");
            match field("car_make") {
                Some(car) => format!("Valet • {name} • {plate} • {car}"),
                None => format!("Valet • {name} • {plate}"),
            }
        }
        NotificationType::WaiterCall => {
            let raw = match item.message.trim() {
                "" => field("customer_message").unwrap_or_default(),
                message => message,
            };
            if raw.eq_ignore_ascii_case(LEGACY_DEFAULT_MESSAGE) || raw == MINIMAL_MESSAGE {
                String::new()
            } else {
                raw.to_string()
            }
        }
    }
}

/// Human label for a notification type (`waiter_call` → `Waiter Call`)
pub fn type_label(kind: NotificationType) -> &'static str {
    match kind {
        NotificationType::WaiterCall => "Waiter Call",
        NotificationType::ValetRequest => "Valet Request",
        NotificationType::TableNote => "Table Note",
    }
}

/// One rendered dropdown row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRow {
    pub id: i64,
    /// `HH:MM` (UTC)
    pub time: String,
    pub kind: &'static str,
    pub table: String,
    pub text: String,
}

impl From<&Notification> for FeedRow {
    fn from(item: &Notification) -> Self {
        let time = chrono::DateTime::from_timestamp_millis(item.created_at)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        let table = if !item.table_name.is_empty() {
            item.table_name.clone()
        } else if !item.table_id.is_empty() {
            format!("Table {}", item.table_id)
        } else {
            "—".to_string()
        };

        Self {
            id: item.id,
            time,
            kind: type_label(item.kind),
            table,
            text: display_text(item),
        }
    }
}
