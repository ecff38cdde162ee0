//! WhatsApp notifications

use shared::error::{AppError, ErrorCode};
use shared::models::{MessageStatus, Order, WhatsAppIntegration, WhatsAppMessage};
use shared::util::now_millis;

use crate::db;
use crate::db::whatsapp::NewMessage;
use crate::error::ServiceResult;
use crate::integrations::whatsapp::{normalize_phone, order_status_message};
use crate::state::AppState;

/// Send through the restaurant's provider and record the outcome.
///
/// Failed provider calls are logged as `failed` and returned as errors.
pub async fn send_logged(
    state: &AppState,
    restaurant_id: i64,
    integration: &WhatsAppIntegration,
    to: &str,
    body: &str,
    order_id: Option<i64>,
) -> ServiceResult<WhatsAppMessage> {
    let phone = normalize_phone(to).map_err(AppError::from)?;
    let result = state.whatsapp.send(integration, &phone, body).await;

    let mut entry = NewMessage {
        to_phone: &phone,
        body,
        status: MessageStatus::Sent,
        provider_message_id: None,
        error: None,
        order_id,
        now: now_millis(),
    };
    match result {
        Ok(provider_id) => {
            entry.provider_message_id = Some(&provider_id);
            let msg = db::whatsapp::log_message(&state.pool, restaurant_id, &entry).await?;
            tracing::info!(restaurant_id, message_id = msg.id, "WhatsApp message sent");
            Ok(msg)
        }
        Err(e) => {
            let error = e.to_string();
            entry.status = MessageStatus::Failed;
            entry.error = Some(&error);
            db::whatsapp::log_message(&state.pool, restaurant_id, &entry).await?;
            tracing::warn!(restaurant_id, error = %error, "WhatsApp send failed");
            Err(AppError::from(e).into())
        }
    }
}

/// Manual send from the dashboard
pub async fn send_manual(
    state: &AppState,
    restaurant_id: i64,
    to: &str,
    body: &str,
) -> ServiceResult<WhatsAppMessage> {
    if body.trim().is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField)
            .with_detail("field", "body")
            .into());
    }
    let integration = db::whatsapp::find(&state.pool, restaurant_id)
        .await?
        .filter(|i| i.enabled)
        .ok_or_else(|| AppError::new(ErrorCode::WhatsAppNotConfigured))?;
    send_logged(state, restaurant_id, &integration, to, body.trim(), None).await
}

/// Notify the customer about a status change in the background.
///
/// Skipped without a phone or an enabled integration; failures are logged.
pub fn spawn_status_notification(state: AppState, restaurant_id: i64, order: Order) {
    if order.customer_phone.is_none() {
        return;
    }
    tokio::spawn(async move {
        if let Err(e) = notify_status(&state, restaurant_id, &order).await {
            let err: AppError = e.into();
            tracing::warn!(
                restaurant_id,
                order_id = order.id,
                code = err.code.code(),
                "Order status notification failed: {}",
                err.message
            );
        }
    });
}

async fn notify_status(state: &AppState, restaurant_id: i64, order: &Order) -> ServiceResult<()> {
    let Some(phone) = order.customer_phone.as_deref() else {
        return Ok(());
    };
    let Some(integration) = db::whatsapp::find(&state.pool, restaurant_id)
        .await?
        .filter(|i| i.enabled)
    else {
        return Ok(());
    };
    let restaurant = db::restaurants::find(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;

    let body = order_status_message(&restaurant.name, order);
    send_logged(state, restaurant_id, &integration, phone, &body, Some(order.id)).await?;
    Ok(())
}
