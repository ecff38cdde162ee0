//! Change feed payload
//!
//! Every mutation on a tenant's orders, mesas or catalog produces a
//! [`ChangeEvent`] that is fanned out to the restaurant's realtime
//! subscribers.

use serde::{Deserialize, Serialize};

/// Kind of row change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// One row change, scoped to a restaurant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    /// Table name (`orders`, `mesas`, `products`, ...)
    pub table: String,
    pub action: ChangeAction,
    pub restaurant_id: i64,
    /// The row after the change; for deletes, `{"id": ...}`
    pub record: serde_json::Value,
    /// Unix millis
    pub at: i64,
}

impl ChangeEvent {
    pub fn new(
        table: impl Into<String>,
        action: ChangeAction,
        restaurant_id: i64,
        record: serde_json::Value,
    ) -> Self {
        Self {
            table: table.into(),
            action,
            restaurant_id,
            record,
            at: crate::util::now_millis(),
        }
    }

    /// Serialize a row into an event; falls back to `null` on failure
    pub fn for_row<T: Serialize>(
        table: &str,
        action: ChangeAction,
        restaurant_id: i64,
        row: &T,
    ) -> Self {
        let record = serde_json::to_value(row).unwrap_or_else(|e| {
            tracing::warn!(table, error = %e, "Failed to serialize change record");
            serde_json::Value::Null
        });
        Self::new(table, action, restaurant_id, record)
    }

    /// Delete event carrying only the id
    pub fn deleted(table: &str, restaurant_id: i64, id: i64) -> Self {
        Self::new(
            table,
            ChangeAction::Delete,
            restaurant_id,
            serde_json::json!({ "id": id }),
        )
    }
}

/// Message pushed to WebSocket clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeMessage {
    /// A row changed
    Change(ChangeEvent),
    /// Events were dropped; the client must refetch everything
    Resync { missed: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_message_is_tagged() {
        let ev = ChangeEvent::deleted("mesas", 9, 42);
        let json = serde_json::to_value(RealtimeMessage::Change(ev)).unwrap();
        assert_eq!(json["type"], "change");
        assert_eq!(json["table"], "mesas");
        assert_eq!(json["action"], "delete");
        assert_eq!(json["record"]["id"], 42);
    }

    #[test]
    fn resync_message_shape() {
        let json = serde_json::to_string(&RealtimeMessage::Resync { missed: 3 }).unwrap();
        assert_eq!(json, r#"{"type":"resync","missed":3}"#);
    }
}
