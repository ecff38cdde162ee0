//! iFood Merchant API integration
//!
//! - [`client`]: OAuth token cache, event polling, order details, status actions
//! - [`mapper`]: iFood order JSON → local `OrderCreate`, status → actions
//! - [`sync`]: one polling round per restaurant and the background worker

pub mod client;
pub mod mapper;
pub mod sync;

pub use client::IfoodClient;
pub use sync::IfoodSyncWorker;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IfoodError {
    #[error("iFood integration is not configured or disabled")]
    NotConfigured,

    #[error("iFood authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("iFood request failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected iFood payload: {0}")]
    Payload(String),
}

impl From<IfoodError> for AppError {
    fn from(e: IfoodError) -> Self {
        let code = match &e {
            IfoodError::NotConfigured => ErrorCode::IfoodNotConfigured,
            IfoodError::Auth(_) => ErrorCode::IfoodAuthFailed,
            _ => ErrorCode::IfoodRequestFailed,
        };
        AppError::with_message(code, e.to_string())
    }
}
