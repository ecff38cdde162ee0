//! `AppError` and the JSON envelope sent to the dashboard

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Business or infrastructure failure carried to the client.
///
/// The numeric `code` is what the dashboard switches on; `message` is for
/// humans and `details` carries the field or resource that failed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// `msg` names the missing grant, e.g. `pedidos:edit`
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }
}

/// Response envelope
///
/// Errors are sent as `{code, message, details}`; `data` is only present
/// on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        (self.http_status(), axum::Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_comes_from_code() {
        let err = AppError::new(ErrorCode::MesaNotFound);
        assert_eq!(err.message, "Mesa not found");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "Mesa not found");
    }

    #[test]
    fn details_accumulate() {
        let err = AppError::new(ErrorCode::RequiredField)
            .with_detail("field", "price")
            .with_detail("line", 2);
        let details = err.details.unwrap();
        assert_eq!(details["field"], "price");
        assert_eq!(details["line"], 2);
    }

    #[test]
    fn auth_errors_map_to_http() {
        let err = AppError::permission_denied("pdv:edit");
        assert_eq!(err.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(err.message, "pdv:edit");
        assert_eq!(AppError::invalid_credentials().http_status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn error_envelope_has_no_data() {
        let err = AppError::new(ErrorCode::OrderEmpty).with_detail("items", 0);
        let json = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(json["code"], 4007);
        assert!(json.get("data").is_none());
        assert_eq!(json["details"]["items"], 0);

        let ok = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(ok["code"], 0);
        assert_eq!(ok["data"], serde_json::json!([1, 2]));
        assert!(ok.get("details").is_none());
    }
}
