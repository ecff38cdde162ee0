//! iFood REST client
//!
//! One client serves every restaurant; access tokens are cached per
//! `client_id` until 60 seconds before they expire.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use shared::models::IfoodIntegration;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

use super::IfoodError;
use super::mapper::{IfoodAction, IfoodOrder};

/// Refresh margin before the token's real expiry
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Polled order event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IfoodEvent {
    pub id: String,
    /// Short code (`PLC`, `CFM`, `CAN`, ...)
    #[serde(default)]
    pub code: String,
    /// Long code (`PLACED`, `CONFIRMED`, `CANCELLED`, ...)
    #[serde(default)]
    pub full_code: Option<String>,
    pub order_id: String,
    #[serde(default)]
    pub merchant_id: Option<String>,
}

/// What an event means for the local order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Placed,
    Cancelled,
    Other,
}

impl IfoodEvent {
    pub fn kind(&self) -> EventKind {
        match self.full_code.as_deref().unwrap_or(self.code.as_str()) {
            "PLACED" | "PLC" => EventKind::Placed,
            "CANCELLED" | "CAN" => EventKind::Cancelled,
            _ => EventKind::Other,
        }
    }
}

#[derive(Clone)]
pub struct IfoodClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<DashMap<String, CachedToken>>,
}

impl IfoodClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Access token for the merchant credentials (cached)
    pub async fn token(&self, creds: &IfoodIntegration) -> Result<String, IfoodError> {
        if let Some(cached) = self.tokens.get(&creds.client_id)
            && cached.expires_at > Instant::now()
        {
            return Ok(cached.access_token.clone());
        }

        let resp = self
            .http
            .post(format!("{}/authentication/v1.0/oauth/token", self.base_url))
            .form(&[
                ("grantType", "client_credentials"),
                ("clientId", creds.client_id.as_str()),
                ("clientSecret", creds.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(client_id = %creds.client_id, %status, "iFood token request rejected");
            return Err(IfoodError::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| IfoodError::Auth(e.to_string()))?;
        let ttl = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        self.tokens.insert(
            creds.client_id.clone(),
            CachedToken {
                access_token: token.access_token.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(token.access_token)
    }

    pub fn invalidate_token(&self, client_id: &str) {
        self.tokens.remove(client_id);
    }

    /// Pending events for the merchant; empty on `204 No Content`
    pub async fn poll_events(&self, creds: &IfoodIntegration) -> Result<Vec<IfoodEvent>, IfoodError> {
        let token = self.token(creds).await?;
        let resp = self
            .http
            .get(format!("{}/order/v1.0/events:polling", self.base_url))
            .bearer_auth(&token)
            .header("x-polling-merchants", &creds.merchant_id)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let resp = self.check(creds, resp).await?;
        resp.json()
            .await
            .map_err(|e| IfoodError::Payload(e.to_string()))
    }

    pub async fn order_details(
        &self,
        creds: &IfoodIntegration,
        order_id: &str,
    ) -> Result<IfoodOrder, IfoodError> {
        let token = self.token(creds).await?;
        let resp = self
            .http
            .get(format!("{}/order/v1.0/orders/{order_id}", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;
        let resp = self.check(creds, resp).await?;
        resp.json()
            .await
            .map_err(|e| IfoodError::Payload(e.to_string()))
    }

    pub async fn acknowledge(
        &self,
        creds: &IfoodIntegration,
        events: &[IfoodEvent],
    ) -> Result<(), IfoodError> {
        if events.is_empty() {
            return Ok(());
        }
        let token = self.token(creds).await?;
        let body: Vec<serde_json::Value> = events
            .iter()
            .map(|e| serde_json::json!({ "id": e.id }))
            .collect();
        let resp = self
            .http
            .post(format!("{}/order/v1.0/events/acknowledgment", self.base_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        self.check(creds, resp).await?;
        Ok(())
    }

    /// Run a status action on an iFood order
    pub async fn perform(
        &self,
        creds: &IfoodIntegration,
        order_id: &str,
        action: IfoodAction,
    ) -> Result<(), IfoodError> {
        let token = self.token(creds).await?;
        let mut req = self
            .http
            .post(format!(
                "{}/order/v1.0/orders/{order_id}/{}",
                self.base_url,
                action.path()
            ))
            .bearer_auth(&token);
        if action == IfoodAction::RequestCancellation {
            req = req.json(&serde_json::json!({
                "reason": "Pedido cancelado pelo restaurante",
                "cancellationCode": "501",
            }));
        }
        let resp = req.send().await?;
        self.check(creds, resp).await?;
        tracing::debug!(order_id, action = action.path(), "iFood action accepted");
        Ok(())
    }

    /// Map non-2xx responses to errors; a 401 drops the cached token
    async fn check(
        &self,
        creds: &IfoodIntegration,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, IfoodError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.invalidate_token(&creds.client_id);
            return Err(IfoodError::Auth(body));
        }
        Err(IfoodError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::test_upstream;
    use axum::{
        Form, Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post},
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn creds() -> IfoodIntegration {
        IfoodIntegration {
            restaurant_id: 1,
            client_id: "cid".into(),
            client_secret: "csecret".into(),
            merchant_id: "m-1".into(),
            enabled: true,
            auto_confirm: false,
            last_polled_at: None,
            updated_at: 0,
        }
    }

    #[derive(Clone, Default)]
    struct Calls {
        token: Arc<AtomicUsize>,
        actions: Arc<std::sync::Mutex<Vec<String>>>,
    }

    fn upstream(calls: Calls) -> Router {
        Router::new()
            .route(
                "/authentication/v1.0/oauth/token",
                post(
                    |State(calls): State<Calls>, Form(form): Form<HashMap<String, String>>| async move {
                        assert_eq!(form["grantType"], "client_credentials");
                        if form["clientSecret"] != "csecret" {
                            return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({}))).into_response();
                        }
                        calls.token.fetch_add(1, Ordering::SeqCst);
                        (
                            StatusCode::OK,
                            Json(serde_json::json!({
                                "accessToken": "tok-1",
                                "type": "bearer",
                                "expiresIn": 21600
                            })),
                        )
                            .into_response()
                    },
                ),
            )
            .route(
                "/order/v1.0/events:polling",
                get(|headers: HeaderMap| async move {
                    assert_eq!(headers["authorization"], "Bearer tok-1");
                    assert_eq!(headers["x-polling-merchants"], "m-1");
                    Json(serde_json::json!([
                        { "id": "ev1", "code": "PLC", "fullCode": "PLACED", "orderId": "o1" },
                        { "id": "ev2", "code": "CAN", "orderId": "o2" }
                    ]))
                }),
            )
            .route(
                "/order/v1.0/orders/{id}/{action}",
                post(
                    |State(calls): State<Calls>, Path((id, action)): Path<(String, String)>| async move {
                        calls.actions.lock().unwrap().push(format!("{id}:{action}"));
                        StatusCode::ACCEPTED
                    },
                ),
            )
            .route(
                "/order/v1.0/events/acknowledgment",
                post(|Json(body): Json<Vec<serde_json::Value>>| async move {
                    assert_eq!(body.len(), 2);
                    StatusCode::ACCEPTED
                }),
            )
            .with_state(calls)
    }

    #[tokio::test]
    async fn token_is_cached() {
        let calls = Calls::default();
        let base = test_upstream::spawn(upstream(calls.clone())).await;
        let client = IfoodClient::new(reqwest::Client::new(), &base);

        assert_eq!(client.token(&creds()).await.unwrap(), "tok-1");
        assert_eq!(client.token(&creds()).await.unwrap(), "tok-1");
        assert_eq!(calls.token.load(Ordering::SeqCst), 1);

        client.invalidate_token("cid");
        client.token(&creds()).await.unwrap();
        assert_eq!(calls.token.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bad_credentials_are_auth_errors() {
        let base = test_upstream::spawn(upstream(Calls::default())).await;
        let client = IfoodClient::new(reqwest::Client::new(), &base);
        let mut bad = creds();
        bad.client_secret = "wrong".into();

        assert!(matches!(client.token(&bad).await, Err(IfoodError::Auth(_))));
    }

    #[tokio::test]
    async fn poll_perform_and_acknowledge() {
        let calls = Calls::default();
        let base = test_upstream::spawn(upstream(calls.clone())).await;
        let client = IfoodClient::new(reqwest::Client::new(), &base);

        let events = client.poll_events(&creds()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), EventKind::Placed);
        assert_eq!(events[1].kind(), EventKind::Cancelled);

        client
            .perform(&creds(), "o1", IfoodAction::StartPreparation)
            .await
            .unwrap();
        client
            .perform(&creds(), "o1", IfoodAction::Dispatch)
            .await
            .unwrap();
        assert_eq!(
            *calls.actions.lock().unwrap(),
            vec!["o1:startPreparation".to_string(), "o1:dispatch".to_string()]
        );

        client.acknowledge(&creds(), &events).await.unwrap();
    }

    #[test]
    fn event_kind_from_short_code() {
        let ev = IfoodEvent {
            id: "e".into(),
            code: "CFM".into(),
            full_code: None,
            order_id: "o".into(),
            merchant_id: None,
        };
        assert_eq!(ev.kind(), EventKind::Other);
    }
}
