//! Registration and login
//!
//! POST /api/auth/register: restaurant + owner account + trial subscription
//! POST /api/auth/login: email/password, returns a 24 h JWT

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Restaurant, validate_name};
use shared::util::{now_millis, slugify};

use super::ApiResult;
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::tenant_auth::{AccountRole, AuthIdentity, create_token};
use crate::db;
use crate::error::{internal, is_unique_violation};
use crate::state::AppState;

/// Suffixes tried after the bare slug (`bar-do-ze`, `bar-do-ze-2`, ...)
const MAX_SLUG_ATTEMPTS: u32 = 20;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub restaurant_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub role: AccountRole,
    pub employee_id: Option<i64>,
    pub restaurant: Restaurant,
}

pub(crate) fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", "email"));
    }
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if !valid {
        return Err(
            AppError::with_message(ErrorCode::InvalidFormat, "Invalid email address")
                .with_detail("field", "email"),
        );
    }
    Ok(email)
}

fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{}", attempt + 1)
    }
}

async fn free_slug(state: &AppState, name: &str) -> Result<String, AppError> {
    let base = slugify(name);
    for attempt in 0..MAX_SLUG_ATTEMPTS {
        let candidate = slug_candidate(&base, attempt);
        if !db::restaurants::slug_exists(&state.pool, &candidate)
            .await
            .map_err(internal)?
        {
            return Ok(candidate);
        }
    }
    Err(AppError::new(ErrorCode::SlugTaken).with_detail("slug", base))
}

fn issue_token(state: &AppState, identity: &AuthIdentity) -> Result<String, AppError> {
    create_token(identity, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    validate_name(&req.restaurant_name, "restaurant_name")?;
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    if db::accounts::email_exists(&state.pool, &email)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered));
    }

    let slug = free_slug(&state, &req.restaurant_name).await?;
    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let owner = db::accounts::NewOwner {
        restaurant_name: req.restaurant_name.trim(),
        slug: &slug,
        phone: req.phone.as_deref().filter(|p| !p.trim().is_empty()),
        email: &email,
        password_hash: &password_hash,
        now: now_millis(),
    };
    let (restaurant, account_id) = match db::accounts::register_owner(&state.pool, &owner).await {
        Ok(created) => created,
        // lost a race on the email or the slug
        Err(e) if is_unique_violation(&e) => {
            let email_taken = db::accounts::email_exists(&state.pool, &email)
                .await
                .map_err(internal)?;
            return Err(if email_taken {
                AppError::new(ErrorCode::EmailAlreadyRegistered)
            } else {
                AppError::new(ErrorCode::SlugTaken).with_detail("slug", slug)
            });
        }
        Err(e) => return Err(internal(e)),
    };

    let identity = AuthIdentity {
        account_id,
        restaurant_id: restaurant.id,
        role: AccountRole::Owner,
        employee_id: None,
    };
    let token = issue_token(&state, &identity)?;

    tracing::info!(restaurant_id = restaurant.id, slug = %restaurant.slug, "Restaurant registered");
    Ok(Json(AuthResponse {
        token,
        role: AccountRole::Owner,
        employee_id: None,
        restaurant,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();
    let account = db::accounts::find_by_email(&state.pool, &email)
        .await
        .map_err(|e| {
            tracing::error!("DB error during login: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &account.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    if let Some(employee_id) = account.employee_id {
        let active = db::employees::find(&state.pool, account.restaurant_id, employee_id)
            .await
            .map_err(internal)?
            .is_some_and(|e| e.is_active);
        if !active {
            tracing::info!(account_id = account.id, "Login refused for disabled employee");
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }
    }

    let restaurant = db::restaurants::find(&state.pool, account.restaurant_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;

    let role = if account.is_owner {
        AccountRole::Owner
    } else {
        AccountRole::Employee
    };
    let identity = AuthIdentity {
        account_id: account.id,
        restaurant_id: restaurant.id,
        role,
        employee_id: account.employee_id,
    };
    let token = issue_token(&state, &identity)?;

    tracing::info!(account_id = account.id, restaurant_id = restaurant.id, "Login");
    Ok(Json(AuthResponse {
        token,
        role,
        employee_id: account.employee_id,
        restaurant,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email("  Dono@Bar.com.BR ").unwrap(),
            "dono@bar.com.br"
        );
        assert_eq!(
            normalize_email("").unwrap_err().code,
            ErrorCode::RequiredField
        );
        assert_eq!(
            normalize_email("sem-arroba").unwrap_err().code,
            ErrorCode::InvalidFormat
        );
        assert!(normalize_email("@dominio.com").is_err());
    }

    #[test]
    fn slug_candidates_count_from_two() {
        assert_eq!(slug_candidate("bar-do-ze", 0), "bar-do-ze");
        assert_eq!(slug_candidate("bar-do-ze", 1), "bar-do-ze-2");
        assert_eq!(slug_candidate("bar-do-ze", 4), "bar-do-ze-5");
    }
}
