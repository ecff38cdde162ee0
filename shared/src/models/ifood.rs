//! iFood integration model

use serde::{Deserialize, Serialize};

/// Per-restaurant iFood merchant credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct IfoodIntegration {
    pub restaurant_id: i64,
    pub client_id: String,
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    pub merchant_id: String,
    pub enabled: bool,
    /// Orders are confirmed on iFood as soon as they are imported
    pub auto_confirm: bool,
    pub last_polled_at: Option<i64>,
    pub updated_at: i64,
}

/// Upsert payload; `None` secret keeps the stored value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfoodIntegrationUpdate {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub merchant_id: String,
    pub enabled: bool,
    #[serde(default)]
    pub auto_confirm: bool,
}

/// Result of one polling round
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IfoodSyncReport {
    pub events: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub cancelled: usize,
}
