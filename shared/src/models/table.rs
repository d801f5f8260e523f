//! Dining table metadata used to enrich notifications

use serde::{Deserialize, Serialize};

/// Table information (read-mostly, cached by the table directory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableInfo {
    pub table_id: i64,
    pub table_name: String,
    pub qr_code: Option<String>,
    pub min_capacity: i32,
    pub max_capacity: i32,
    pub is_joinable: bool,
    pub priority: i32,
}
