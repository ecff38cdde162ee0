//! JWT authentication for the dashboard API
//!
//! Tokens are HS256, valid for 24 hours, and scope every request to one
//! restaurant. The middleware inserts an [`AuthIdentity`] extension.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

/// Who signed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Owner,
    Employee,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: i64,
    pub restaurant_id: i64,
    pub role: AccountRole,
    /// Present for employee accounts
    pub employee_id: Option<i64>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity extracted from the JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthIdentity {
    pub account_id: i64,
    pub restaurant_id: i64,
    pub role: AccountRole,
    pub employee_id: Option<i64>,
}

impl AuthIdentity {
    pub fn is_owner(&self) -> bool {
        self.role == AccountRole::Owner
    }
}

const JWT_EXPIRY_HOURS: i64 = 24;

pub fn create_token(
    identity: &AuthIdentity,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: identity.account_id,
        restaurant_id: identity.restaurant_id,
        role: identity.role,
        employee_id: identity.employee_id,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a token (signature + expiry)
pub fn verify_token(token: &str, secret: &str) -> Result<AuthIdentity, AppError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired)
            }
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })?;

    let c = data.claims;
    Ok(AuthIdentity {
        account_id: c.sub,
        restaurant_id: c.restaurant_id,
        role: c.role,
        employee_id: c.employee_id,
    })
}

/// Middleware that verifies the `Authorization: Bearer` JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::invalid_token("Invalid Authorization format").into_response()
    })?;

    let identity = verify_token(token, &state.jwt_secret).map_err(IntoResponse::into_response)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> AuthIdentity {
        AuthIdentity {
            account_id: 11,
            restaurant_id: 22,
            role: AccountRole::Employee,
            employee_id: Some(33),
        }
    }

    #[test]
    fn token_roundtrip() {
        let token = create_token(&employee(), "secret").unwrap();
        let identity = verify_token(&token, "secret").unwrap();
        assert_eq!(identity, employee());
        assert!(!identity.is_owner());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = create_token(&employee(), "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims {
            sub: 1,
            restaurant_id: 2,
            role: AccountRole::Owner,
            employee_id: None,
            exp: 1_000,
            iat: 0,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(
            verify_token(&token, "secret").unwrap_err().code,
            ErrorCode::TokenExpired
        );
    }
}
