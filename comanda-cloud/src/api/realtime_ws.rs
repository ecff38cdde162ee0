//! Realtime WebSocket
//!
//! GET /api/realtime/ws?token=<JWT>
//!
//! Browsers cannot set headers on a WebSocket handshake, so the session
//! token travels in the query string. The feed carries order rows, so
//! the caller needs `pedidos` view access. Every [`ChangeEvent`] of the
//! caller's restaurant is pushed as a [`RealtimeMessage::Change`]; a
//! subscriber that falls behind gets [`RealtimeMessage::Resync`] and is
//! expected to refetch.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::PermissionModule;
use shared::realtime::RealtimeMessage;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::auth::{AuthIdentity, require_permission, tenant_auth};
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

pub async fn handle_realtime_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let identity = authorize(&state, &query.token).await?;
    let restaurant_id = identity.restaurant_id;
    Ok(ws.on_upgrade(move |socket| realtime_session(socket, state, restaurant_id)))
}

/// Checked before the upgrade so a refused caller gets a JSON error
async fn authorize(state: &AppState, token: &str) -> Result<AuthIdentity, AppError> {
    let identity = tenant_auth::verify_token(token, &state.jwt_secret).inspect_err(|e| {
        tracing::debug!("Realtime WS token rejected: {}", e.message);
    })?;
    require_permission(state, &identity, PermissionModule::Pedidos, false)
        .await
        .inspect_err(|e| {
            tracing::debug!(
                restaurant_id = identity.restaurant_id,
                account_id = identity.account_id,
                "Realtime WS refused: {}",
                e.message
            );
        })?;
    Ok(identity)
}

async fn realtime_session(socket: WebSocket, state: AppState, restaurant_id: i64) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = state.realtime.subscribe(restaurant_id);
    tracing::info!(
        restaurant_id,
        subscribers = state.realtime.subscriber_count(restaurant_id),
        "Realtime WS connected"
    );

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                let msg = match event {
                    Ok(change) => RealtimeMessage::Change(change),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(restaurant_id, missed, "Realtime subscriber lagged, asking for resync");
                        rx = state.realtime.subscribe(restaurant_id);
                        RealtimeMessage::Resync { missed }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if send_message(&mut sink, &msg).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    // the feed is one-way
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    drop(rx);
    state.realtime.prune(restaurant_id);
    tracing::info!(restaurant_id, "Realtime WS disconnected");
}

async fn send_message(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &RealtimeMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize realtime message: {e}");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccountRole;
    use crate::db::{self, fixtures};
    use shared::error::ErrorCode;
    use shared::models::{EmployeeCreate, EmployeeRole, ModulePermission, PermissionSet};
    use shared::realtime::{ChangeAction, ChangeEvent};
    use shared::util::now_millis;
    use sqlx::PgPool;

    async fn employee_token(pool: &PgPool, restaurant_id: i64, permissions: PermissionSet) -> (i64, String) {
        let data = EmployeeCreate {
            name: "Rita".into(),
            email: None,
            phone: None,
            role: EmployeeRole::Cozinha,
            password: None,
        };
        let employee = db::employees::create(pool, restaurant_id, &data, None, now_millis())
            .await
            .unwrap();
        db::permissions::replace(pool, employee.id, &permissions)
            .await
            .unwrap();
        let identity = AuthIdentity {
            account_id: 900,
            restaurant_id,
            role: AccountRole::Employee,
            employee_id: Some(employee.id),
        };
        let token = tenant_auth::create_token(&identity, "test-secret").unwrap();
        (employee.id, token)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn feed_requires_order_view(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, owner) = fixtures::restaurant(&pool, "boteco").await;
        let rid = restaurant.id;

        let owner_token = tenant_auth::create_token(&owner, "test-secret").unwrap();
        assert_eq!(authorize(&state, &owner_token).await.unwrap(), owner);

        let (_, kitchen) = employee_token(&pool, rid, PermissionSet::for_role(EmployeeRole::Cozinha)).await;
        assert_eq!(authorize(&state, &kitchen).await.unwrap().restaurant_id, rid);

        let catalog_only = PermissionSet::from_entries([ModulePermission::view(PermissionModule::Produtos)]);
        let (_, token) = employee_token(&pool, rid, catalog_only).await;
        let err = authorize(&state, &token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.message, "pedidos:view");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn disabled_employee_cannot_subscribe(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, _) = fixtures::restaurant(&pool, "quiosque").await;
        let (employee_id, token) =
            employee_token(&pool, restaurant.id, PermissionSet::for_role(EmployeeRole::Garcom)).await;
        assert!(authorize(&state, &token).await.is_ok());

        db::employees::set_active(&pool, restaurant.id, employee_id, false)
            .await
            .unwrap();
        let err = authorize(&state, &token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
    }

    #[tokio::test]
    async fn bad_token_is_rejected_before_any_lookup() {
        let state = AppState::for_tests("http://127.0.0.1:9");
        let err = authorize(&state, "not-a-jwt").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn messages_are_tagged() {
        let change = RealtimeMessage::Change(ChangeEvent::new(
            "mesas",
            ChangeAction::Update,
            4,
            serde_json::json!({ "id": 9, "status": "ocupada" }),
        ));
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["type"], "change");
        assert_eq!(value["table"], "mesas");
        assert_eq!(value["record"]["status"], "ocupada");

        let resync = serde_json::to_value(RealtimeMessage::Resync { missed: 3 }).unwrap();
        assert_eq!(resync, serde_json::json!({ "type": "resync", "missed": 3 }));
    }
}
