//! Subscription API (owner only) and the Pagar.me webhook

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{SubscribeRequest, Subscription};

use super::ApiResult;
use crate::auth::{AuthIdentity, require_owner};
use crate::db;
use crate::error::internal;
use crate::integrations::pagarme::{WebhookEvent, verify_basic_auth};
use crate::services::billing;
use crate::state::AppState;

pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Subscription> {
    require_owner(&identity)?;
    let sub = db::subscriptions::find(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::NoSubscription))?;
    Ok(Json(sub))
}

/// POST /api/subscription
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(req): Json<SubscribeRequest>,
) -> ApiResult<Subscription> {
    require_owner(&identity)?;
    let sub = billing::subscribe(&state, identity.restaurant_id, &req).await?;
    Ok(Json(sub))
}

/// DELETE /api/subscription
pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Subscription> {
    require_owner(&identity)?;
    let sub = billing::cancel(&state, identity.restaurant_id).await?;
    Ok(Json(sub))
}

/// POST /webhooks/pagarme
///
/// Credentials are checked before the body is parsed.
pub async fn pagarme_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Value> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if !verify_basic_auth(
        authorization,
        &state.config.pagarme_webhook_user,
        &state.config.pagarme_webhook_password,
    ) {
        tracing::warn!("Rejected Pagar.me webhook with bad credentials");
        return Err(AppError::new(ErrorCode::WebhookUnauthorized));
    }

    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid webhook body: {e}"))
    })?;
    let fresh = billing::apply_webhook(&state, &event).await?;
    Ok(Json(json!({ "received": true, "duplicate": !fresh })))
}
