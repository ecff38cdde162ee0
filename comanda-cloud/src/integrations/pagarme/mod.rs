//! Pagar.me billing via REST API (core v5, no SDK)
//!
//! Requests authenticate with Basic auth `secret_key:`. Webhooks are
//! authenticated with Basic credentials configured on the dashboard.

use base64::Engine;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use shared::models::{Plan, SubscribeRequest, SubscriptionStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PagarmeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pagar.me returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Pagar.me payload: {0}")]
    Payload(String),
}

impl From<PagarmeError> for AppError {
    fn from(e: PagarmeError) -> Self {
        AppError::with_message(ErrorCode::BillingProviderError, e.to_string())
    }
}

/// Subscription as returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSubscription {
    pub id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<i64>,
}

#[derive(Clone)]
pub struct PagarmeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PagarmeClient {
    pub fn new(http: reqwest::Client, base_url: &str, secret_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Create a customer; returns its id (`cus_...`)
    pub async fn create_customer(&self, req: &SubscribeRequest) -> Result<String, PagarmeError> {
        let document: String = req
            .customer_document
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let (kind, document_type) = if document.len() > 11 {
            ("company", "CNPJ")
        } else {
            ("individual", "CPF")
        };
        let resp = self
            .post(
                "/customers",
                &json!({
                    "name": req.customer_name,
                    "email": req.customer_email,
                    "document": document,
                    "document_type": document_type,
                    "type": kind,
                }),
            )
            .await?;
        string_field(&resp, "id")
    }

    /// Attach a tokenized card to a customer; returns the card id
    pub async fn create_card(
        &self,
        customer_id: &str,
        card_token: &str,
    ) -> Result<String, PagarmeError> {
        let resp = self
            .post(
                &format!("/customers/{customer_id}/cards"),
                &json!({ "token": card_token }),
            )
            .await?;
        string_field(&resp, "id")
    }

    /// Monthly credit-card subscription for a plan
    pub async fn create_subscription(
        &self,
        restaurant_id: i64,
        customer_id: &str,
        card_id: &str,
        plan: Plan,
    ) -> Result<ProviderSubscription, PagarmeError> {
        let resp = self
            .post(
                "/subscriptions",
                &json!({
                    "customer_id": customer_id,
                    "card_id": card_id,
                    "payment_method": "credit_card",
                    "interval": "month",
                    "interval_count": 1,
                    "billing_type": "prepaid",
                    "currency": "BRL",
                    "installments": 1,
                    "items": [{
                        "description": format!("comanda {}", plan.as_str()),
                        "quantity": 1,
                        "pricing_scheme": { "price": plan.price_cents() },
                    }],
                    "metadata": {
                        "restaurant_id": restaurant_id.to_string(),
                        "plan": plan.as_str(),
                    },
                }),
            )
            .await?;
        parse_subscription(&resp)
    }

    pub async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, PagarmeError> {
        let resp = self
            .http
            .delete(format!("{}/subscriptions/{subscription_id}", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await?;
        let resp = check(resp).await?;
        parse_subscription(&resp)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, PagarmeError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(body)
            .send()
            .await?;
        check(resp).await
    }
}

async fn check(resp: reqwest::Response) -> Result<Value, PagarmeError> {
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(body);
    }
    let message = body["message"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| body.to_string());
    tracing::warn!(status = status.as_u16(), %message, "Pagar.me request rejected");
    Err(PagarmeError::Api {
        status: status.as_u16(),
        message,
    })
}

fn string_field(value: &Value, field: &str) -> Result<String, PagarmeError> {
    value[field]
        .as_str()
        .map(String::from)
        .ok_or_else(|| PagarmeError::Payload(format!("missing `{field}` in {value}")))
}

/// RFC 3339 timestamp → Unix millis
fn parse_time(value: &Value) -> Option<i64> {
    let s = value.as_str()?;
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

fn parse_subscription(value: &Value) -> Result<ProviderSubscription, PagarmeError> {
    let id = string_field(value, "id")?;
    let raw_status = value["status"].as_str().unwrap_or_default();
    let status = SubscriptionStatus::from_provider(raw_status)
        .ok_or_else(|| PagarmeError::Payload(format!("unknown subscription status `{raw_status}`")))?;
    Ok(ProviderSubscription {
        id,
        status,
        current_period_end: parse_time(&value["current_cycle"]["end_at"]),
    })
}

// ---- Webhooks ----

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

/// Subscription change carried by a webhook event
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionChange {
    pub subscription_id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<i64>,
}

impl WebhookEvent {
    /// The subscription change this event implies, if any
    pub fn subscription_change(&self) -> Option<SubscriptionChange> {
        let data = &self.data;
        match self.event_type.as_str() {
            t if t.starts_with("subscription.") => {
                let status = if t == "subscription.canceled" {
                    SubscriptionStatus::Canceled
                } else {
                    SubscriptionStatus::from_provider(data["status"].as_str()?)?
                };
                Some(SubscriptionChange {
                    subscription_id: data["id"].as_str()?.to_string(),
                    status,
                    current_period_end: parse_time(&data["current_cycle"]["end_at"]),
                })
            }
            "invoice.paid" | "invoice.payment_failed" => {
                let subscription_id = data["subscription"]["id"]
                    .as_str()
                    .or_else(|| data["subscription_id"].as_str())?;
                let status = if self.event_type == "invoice.paid" {
                    SubscriptionStatus::Active
                } else {
                    SubscriptionStatus::PastDue
                };
                Some(SubscriptionChange {
                    subscription_id: subscription_id.to_string(),
                    status,
                    current_period_end: parse_time(&data["cycle"]["end_at"]),
                })
            }
            _ => None,
        }
    }
}

/// Check an `Authorization: Basic` header against the configured pair.
///
/// Both sides are compared as SHA-256 digests so the comparison does
/// not depend on where the first differing byte is.
pub fn verify_basic_auth(header: Option<&str>, user: &str, password: &str) -> bool {
    let Some(encoded) = header.and_then(|h| h.strip_prefix("Basic ")) else {
        return false;
    };
    let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let expected = format!("{user}:{password}");
    Sha256::digest(&decoded) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::test_upstream;
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{delete, post},
    };

    fn basic(user: &str, pass: &str) -> String {
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}"))
        )
    }

    fn request() -> SubscribeRequest {
        SubscribeRequest {
            plan: Plan::Profissional,
            card_token: "token_abc".into(),
            customer_name: "Bar do Zé".into(),
            customer_email: "ze@bar.com.br".into(),
            customer_document: "12.345.678/0001-90".into(),
        }
    }

    fn upstream() -> Router {
        Router::new()
            .route(
                "/customers",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    assert_eq!(headers["authorization"], basic("sk_test", ""));
                    assert_eq!(body["document"], "12345678000190");
                    assert_eq!(body["type"], "company");
                    Json(json!({ "id": "cus_1" }))
                }),
            )
            .route(
                "/customers/{id}/cards",
                post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    assert_eq!(id, "cus_1");
                    assert_eq!(body["token"], "token_abc");
                    Json(json!({ "id": "card_1" }))
                }),
            )
            .route(
                "/subscriptions",
                post(|Json(body): Json<Value>| async move {
                    if body["card_id"] != "card_1" {
                        return (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(json!({ "message": "The request is invalid." })),
                        );
                    }
                    assert_eq!(body["items"][0]["pricing_scheme"]["price"], 9990);
                    (
                        StatusCode::OK,
                        Json(json!({
                            "id": "sub_1",
                            "status": "active",
                            "current_cycle": { "end_at": "2026-11-18T00:00:00Z" }
                        })),
                    )
                }),
            )
            .route(
                "/subscriptions/{id}",
                delete(|Path(id): Path<String>| async move {
                    Json(json!({ "id": id, "status": "canceled" }))
                }),
            )
    }

    #[tokio::test]
    async fn subscribe_flow() {
        let base = test_upstream::spawn(upstream()).await;
        let client = PagarmeClient::new(reqwest::Client::new(), &base, "sk_test");

        let customer = client.create_customer(&request()).await.unwrap();
        let card = client.create_card(&customer, "token_abc").await.unwrap();
        let sub = client
            .create_subscription(7, &customer, &card, Plan::Profissional)
            .await
            .unwrap();

        assert_eq!(sub.id, "sub_1");
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.current_period_end, Some(1_794_960_000_000));

        let canceled = client.cancel_subscription("sub_1").await.unwrap();
        assert_eq!(canceled.status, SubscriptionStatus::Canceled);
    }

    #[tokio::test]
    async fn api_errors_carry_message() {
        let base = test_upstream::spawn(upstream()).await;
        let client = PagarmeClient::new(reqwest::Client::new(), &base, "sk_test");

        let err = client
            .create_subscription(7, "cus_1", "card_x", Plan::Basico)
            .await
            .unwrap_err();
        match &err {
            PagarmeError::Api { status, message } => {
                assert_eq!(*status, 422);
                assert_eq!(message, "The request is invalid.");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(AppError::from(err).code, ErrorCode::BillingProviderError);
    }

    #[test]
    fn webhook_subscription_changes() {
        let event: WebhookEvent = serde_json::from_value(json!({
            "id": "hook_1",
            "type": "subscription.canceled",
            "data": { "id": "sub_1", "status": "canceled" }
        }))
        .unwrap();
        assert_eq!(
            event.subscription_change(),
            Some(SubscriptionChange {
                subscription_id: "sub_1".into(),
                status: SubscriptionStatus::Canceled,
                current_period_end: None,
            })
        );

        let event: WebhookEvent = serde_json::from_value(json!({
            "id": "hook_2",
            "type": "invoice.payment_failed",
            "data": { "id": "in_1", "subscription": { "id": "sub_9" } }
        }))
        .unwrap();
        let change = event.subscription_change().unwrap();
        assert_eq!(change.subscription_id, "sub_9");
        assert_eq!(change.status, SubscriptionStatus::PastDue);

        let event: WebhookEvent = serde_json::from_value(json!({
            "id": "hook_3",
            "type": "charge.created",
            "data": {}
        }))
        .unwrap();
        assert!(event.subscription_change().is_none());
    }

    #[test]
    fn basic_auth_check() {
        assert!(verify_basic_auth(Some(&basic("hook", "s3cret")), "hook", "s3cret"));
        assert!(!verify_basic_auth(Some(&basic("hook", "wrong")), "hook", "s3cret"));
        assert!(!verify_basic_auth(Some("Bearer abc"), "hook", "s3cret"));
        assert!(!verify_basic_auth(Some("Basic !!!"), "hook", "s3cret"));
        assert!(!verify_basic_auth(None, "hook", "s3cret"));
    }
}
