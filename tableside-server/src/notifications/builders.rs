//! Notification drafts per event type

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use shared::models::{NewNotification, NotificationPriority, NotificationType, TableInfo};

static VALET_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)^\s*Table\s+([0-9]+)\s*$").expect("valid pattern"));

pub fn waiter_call(table: &TableInfo, message: &str) -> NewNotification {
    NewNotification {
        kind: NotificationType::WaiterCall,
        title: format!("Waiter Call - {}", table.table_name),
        message: message.to_string(),
        table_id: table.table_id.to_string(),
        table_name: table.table_name.clone(),
        payload: json!({
            "customer_message": message,
            "urgency": "medium",
        }),
        priority: NotificationPriority::Medium,
    }
}

pub fn table_note(table: &TableInfo, note: &str, timestamp: &str) -> NewNotification {
    NewNotification {
        kind: NotificationType::TableNote,
        title: format!("Table Note - {}", table.table_name),
        message: note.to_string(),
        table_id: table.table_id.to_string(),
        table_name: table.table_name.clone(),
        payload: json!({
            "note": note,
            "timestamp": timestamp,
        }),
        priority: NotificationPriority::Low,
    }
}

/// Normalise a free-form valet table identifier into `(table_id, table_name)`
///
/// `"Table 12"` (any case, surrounding spaces) yields `("12", "Table 12")`.
/// Only ASCII digits count as a table number; anything else is kept verbatim.
pub fn normalize_valet_table_id(raw: &str) -> (String, String) {
    let id = match VALET_TABLE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(number) => number.as_str().to_string(),
        None => raw.to_string(),
    };
    let name = format!("Table {id}");
    (id, name)
}

/// Valet request fields as submitted
#[derive(Debug, Clone, Default)]
pub struct ValetInput<'a> {
    pub table_id: &'a str,
    pub name: Option<&'a str>,
    pub car_make: Option<&'a str>,
    pub license_plate: Option<&'a str>,
    pub request_id: Option<&'a str>,
}

pub fn valet_request(input: &ValetInput<'_>) -> NewNotification {
    let (table_id, table_name) = normalize_valet_table_id(input.table_id);
    let details = format!(
        "{table_name} · {} · {}",
        input.license_plate.unwrap_or_default(),
        input.car_make.unwrap_or_default()
    )
    .trim()
    .to_string();

    NewNotification {
        kind: NotificationType::ValetRequest,
        title: "Valet Request".to_string(),
        message: details.clone(),
        payload: json!({
            "name": input.name,
            "car_make": input.car_make,
            "license_plate": input.license_plate,
            "request_id": input.request_id,
            "estimated_duration": "2 hours",
            "details": details,
        }),
        table_id,
        table_name,
        priority: NotificationPriority::Medium,
    }
}
