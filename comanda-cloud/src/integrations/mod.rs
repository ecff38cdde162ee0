//! Third-party HTTP integrations (REST, no SDKs)
//!
//! - [`whatsapp`]: outbound messages via UltraMsg or Twilio
//! - [`ifood`]: merchant order polling and status updates
//! - [`pagarme`]: subscription billing (core v5)

pub mod ifood;
pub mod pagarme;
pub mod whatsapp;

use std::time::Duration;

/// Upstream request timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared reqwest client for every integration
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("comanda-cloud/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}
