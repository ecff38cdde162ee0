//! WhatsApp and iFood settings (`integracoes` module)

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    IfoodIntegration, IfoodIntegrationUpdate, IfoodSyncReport, PermissionModule,
    SendMessageRequest, WhatsAppIntegration, WhatsAppIntegrationUpdate, WhatsAppMessage,
    WhatsAppProvider,
};
use shared::util::now_millis;

use super::ApiResult;
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::error::internal;
use crate::integrations::ifood::sync::sync_restaurant;
use crate::services::notify;
use crate::state::AppState;

pub const DEFAULT_MESSAGE_LIMIT: i64 = 50;
pub const MAX_MESSAGE_LIMIT: i64 = 200;

async fn require_integrations(
    state: &AppState,
    identity: &AuthIdentity,
    edit: bool,
) -> Result<(), AppError> {
    require_permission(state, identity, PermissionModule::Integracoes, edit).await
}

fn required(field: &'static str) -> AppError {
    AppError::new(ErrorCode::RequiredField).with_detail("field", field)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

// ── WhatsApp ──

/// Credentials the provider needs. Secrets may be omitted when one is
/// already stored.
fn validate_whatsapp(
    data: &WhatsAppIntegrationUpdate,
    existing: Option<&WhatsAppIntegration>,
) -> Result<(), AppError> {
    let stored = existing.filter(|e| e.provider == data.provider);
    match data.provider {
        WhatsAppProvider::Ultramsg => {
            if is_blank(&data.instance_id) {
                return Err(required("instance_id"));
            }
            if is_blank(&data.token) && stored.is_none_or(|e| is_blank(&e.token)) {
                return Err(required("token"));
            }
        }
        WhatsAppProvider::Twilio => {
            if is_blank(&data.account_sid) {
                return Err(required("account_sid"));
            }
            if is_blank(&data.from_number) {
                return Err(required("from_number"));
            }
            if is_blank(&data.auth_token) && stored.is_none_or(|e| is_blank(&e.auth_token)) {
                return Err(required("auth_token"));
            }
        }
    }
    Ok(())
}

pub async fn get_whatsapp(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Option<WhatsAppIntegration>> {
    require_integrations(&state, &identity, false).await?;
    let integration = db::whatsapp::find(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(integration))
}

pub async fn put_whatsapp(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<WhatsAppIntegrationUpdate>,
) -> ApiResult<WhatsAppIntegration> {
    require_integrations(&state, &identity, true).await?;
    let rid = identity.restaurant_id;
    let existing = db::whatsapp::find(&state.pool, rid)
        .await
        .map_err(internal)?;
    validate_whatsapp(&data, existing.as_ref())?;

    let integration = db::whatsapp::upsert(&state.pool, rid, &data, now_millis())
        .await
        .map_err(internal)?;
    tracing::info!(
        restaurant_id = rid,
        provider = ?integration.provider,
        enabled = integration.enabled,
        "WhatsApp integration saved"
    );
    Ok(Json(integration))
}

/// POST /api/whatsapp/send
pub async fn send_whatsapp(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<WhatsAppMessage> {
    require_integrations(&state, &identity, true).await?;
    let message = notify::send_manual(&state, identity.restaurant_id, &req.to, &req.body).await?;
    Ok(Json(message))
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<i64>,
}

/// GET /api/whatsapp/messages?limit=
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Vec<WhatsAppMessage>> {
    require_integrations(&state, &identity, false).await?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .clamp(1, MAX_MESSAGE_LIMIT);
    let messages = db::whatsapp::list_messages(&state.pool, identity.restaurant_id, limit)
        .await
        .map_err(internal)?;
    Ok(Json(messages))
}

// ── iFood ──

fn validate_ifood(
    data: &IfoodIntegrationUpdate,
    existing: Option<&IfoodIntegration>,
) -> Result<(), AppError> {
    if data.client_id.trim().is_empty() {
        return Err(required("client_id"));
    }
    if data.merchant_id.trim().is_empty() {
        return Err(required("merchant_id"));
    }
    if is_blank(&data.client_secret) && existing.is_none_or(|e| e.client_secret.is_empty()) {
        return Err(required("client_secret"));
    }
    Ok(())
}

pub async fn get_ifood(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Option<IfoodIntegration>> {
    require_integrations(&state, &identity, false).await?;
    let integration = db::ifood::find(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(integration))
}

pub async fn put_ifood(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<IfoodIntegrationUpdate>,
) -> ApiResult<IfoodIntegration> {
    require_integrations(&state, &identity, true).await?;
    let rid = identity.restaurant_id;
    let existing = db::ifood::find(&state.pool, rid).await.map_err(internal)?;
    validate_ifood(&data, existing.as_ref())?;

    let integration = db::ifood::upsert(&state.pool, rid, &data, now_millis())
        .await
        .map_err(internal)?;
    // new credentials need a new token
    state.ifood.invalidate_token(&integration.client_id);

    tracing::info!(
        restaurant_id = rid,
        merchant_id = %integration.merchant_id,
        enabled = integration.enabled,
        "iFood integration saved"
    );
    Ok(Json(integration))
}

/// POST /api/ifood/sync: one polling round right now
pub async fn sync_ifood(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<IfoodSyncReport> {
    require_integrations(&state, &identity, true).await?;
    let integration = db::ifood::find(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?
        .filter(|i| i.enabled)
        .ok_or_else(|| AppError::new(ErrorCode::IfoodNotConfigured))?;

    let report = sync_restaurant(&state, &integration).await?;
    Ok(Json(report))
}
