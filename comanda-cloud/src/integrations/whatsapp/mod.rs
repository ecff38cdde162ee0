//! WhatsApp messaging (UltraMsg / Twilio)
//!
//! Outbound only. The provider is chosen per restaurant from its
//! [`WhatsAppIntegration`] row.

mod twilio;
mod ultramsg;

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, WhatsAppIntegration, WhatsAppProvider};
use shared::util::format_brl;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("WhatsApp integration is not configured or disabled")]
    NotConfigured,

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message: {0}")]
    Rejected(String),
}

impl From<WhatsAppError> for AppError {
    fn from(e: WhatsAppError) -> Self {
        let code = match &e {
            WhatsAppError::NotConfigured | WhatsAppError::MissingCredential(_) => {
                ErrorCode::WhatsAppNotConfigured
            }
            WhatsAppError::InvalidPhone(_) => ErrorCode::InvalidPhoneNumber,
            WhatsAppError::Http(_) | WhatsAppError::Rejected(_) => ErrorCode::WhatsAppSendFailed,
        };
        AppError::with_message(code, e.to_string())
    }
}

/// Normalize a Brazilian phone number to `55` + DDD + number, digits only.
///
/// Accepts 10/11-digit local numbers (DDD + 8/9 digits) and 12/13-digit
/// numbers already carrying the `55` country code. A leading trunk `0`
/// is dropped.
pub fn normalize_phone(raw: &str) -> Result<String, WhatsAppError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_start_matches('0');

    match digits.len() {
        10 | 11 => Ok(format!("55{digits}")),
        12 | 13 if digits.starts_with("55") => Ok(digits.to_string()),
        _ => Err(WhatsAppError::InvalidPhone(raw.to_string())),
    }
}

/// Customer notification text for an order status change
pub fn order_status_message(restaurant_name: &str, order: &Order) -> String {
    format!(
        "Olá{}! Seu pedido #{} em {} está {}. Total: {}.",
        order
            .customer_name
            .as_deref()
            .map(|n| format!(", {}", n.split_whitespace().next().unwrap_or(n)))
            .unwrap_or_default(),
        order.number,
        restaurant_name,
        order.status.label(),
        format_brl(order.total),
    )
}

/// Provider-agnostic sender
#[derive(Clone)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    ultramsg_base: String,
    twilio_base: String,
}

impl WhatsAppClient {
    pub fn new(http: reqwest::Client, ultramsg_base: &str, twilio_base: &str) -> Self {
        Self {
            http,
            ultramsg_base: ultramsg_base.trim_end_matches('/').to_string(),
            twilio_base: twilio_base.trim_end_matches('/').to_string(),
        }
    }

    /// Send a text message; returns the provider's message id
    pub async fn send(
        &self,
        integration: &WhatsAppIntegration,
        to: &str,
        body: &str,
    ) -> Result<String, WhatsAppError> {
        if !integration.enabled {
            return Err(WhatsAppError::NotConfigured);
        }
        let phone = normalize_phone(to)?;

        match integration.provider {
            WhatsAppProvider::Ultramsg => {
                let instance = required(&integration.instance_id, "instance_id")?;
                let token = required(&integration.token, "token")?;
                ultramsg::send(&self.http, &self.ultramsg_base, instance, token, &phone, body).await
            }
            WhatsAppProvider::Twilio => {
                let sid = required(&integration.account_sid, "account_sid")?;
                let auth = required(&integration.auth_token, "auth_token")?;
                let from = required(&integration.from_number, "from_number")?;
                let from: String = from.chars().filter(char::is_ascii_digit).collect();
                twilio::send(&self.http, &self.twilio_base, sid, auth, &from, &phone, body).await
            }
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, WhatsAppError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(WhatsAppError::MissingCredential(name))
}

#[cfg(test)]
mod tests;
