//! WhatsApp integration models

use serde::{Deserialize, Serialize};

/// Messaging provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "whatsapp_provider", rename_all = "snake_case")
)]
pub enum WhatsAppProvider {
    Ultramsg,
    Twilio,
}

/// Per-restaurant WhatsApp configuration
///
/// Secrets are never serialized back to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WhatsAppIntegration {
    pub restaurant_id: i64,
    pub provider: WhatsAppProvider,
    /// UltraMsg instance id
    pub instance_id: Option<String>,
    /// UltraMsg token
    #[serde(skip_serializing, default)]
    pub token: Option<String>,
    /// Twilio account SID
    pub account_sid: Option<String>,
    /// Twilio auth token
    #[serde(skip_serializing, default)]
    pub auth_token: Option<String>,
    /// Twilio sender number
    pub from_number: Option<String>,
    pub enabled: bool,
    pub updated_at: i64,
}

/// Upsert payload; `None` secrets keep the stored value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppIntegrationUpdate {
    pub provider: WhatsAppProvider,
    pub instance_id: Option<String>,
    pub token: Option<String>,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
    pub enabled: bool,
}

/// Delivery outcome of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "message_status", rename_all = "snake_case")
)]
pub enum MessageStatus {
    Sent,
    Failed,
}

/// Message log row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WhatsAppMessage {
    pub id: i64,
    pub to_phone: String,
    pub body: String,
    pub status: MessageStatus,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub order_id: Option<i64>,
    pub created_at: i64,
}

/// Manual send payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub to: String,
    pub body: String,
}
