use super::*;
use crate::integrations::test_upstream;
use axum::{Form, Json, Router, http::HeaderMap, routing::post};
use shared::models::{OrderSource, OrderStatus, OrderType};
use std::collections::HashMap;

fn integration(provider: WhatsAppProvider) -> WhatsAppIntegration {
    WhatsAppIntegration {
        restaurant_id: 1,
        provider,
        instance_id: Some("instance42".into()),
        token: Some("tok".into()),
        account_sid: Some("AC123".into()),
        auth_token: Some("auth".into()),
        from_number: Some("+1 415 555 0100".into()),
        enabled: true,
        updated_at: 0,
    }
}

fn order() -> Order {
    Order {
        id: 1,
        number: 27,
        source: OrderSource::Pdv,
        order_type: OrderType::Delivery,
        status: OrderStatus::SaiuEntrega,
        mesa_id: None,
        customer_name: Some("Maria da Silva".into()),
        customer_phone: Some("(11) 98765-4321".into()),
        delivery_address: Some("Rua B, 20".into()),
        payment_method: None,
        subtotal: 50.0,
        discount: 0.0,
        service_fee: 0.0,
        delivery_fee: 7.5,
        total: 57.5,
        notes: None,
        external_id: None,
        created_at: 0,
        updated_at: 0,
    }
}

#[test]
fn phone_normalization() {
    assert_eq!(normalize_phone("(11) 98765-4321").unwrap(), "5511987654321");
    assert_eq!(normalize_phone("011 3333-4444").unwrap(), "551133334444");
    assert_eq!(normalize_phone("+55 21 99999-0000").unwrap(), "5521999990000");
    assert!(normalize_phone("12345").is_err());
    assert!(normalize_phone("+1 415 555 0100 99").is_err());
}

#[test]
fn status_message_text() {
    let text = order_status_message("Cantina da Nona", &order());
    assert_eq!(
        text,
        "Olá, Maria! Seu pedido #27 em Cantina da Nona está saiu para entrega. Total: R$ 57,50."
    );
}

#[test]
fn error_codes() {
    let err: AppError = WhatsAppError::InvalidPhone("x".into()).into();
    assert_eq!(err.code, ErrorCode::InvalidPhoneNumber);
    let err: AppError = WhatsAppError::MissingCredential("token").into();
    assert_eq!(err.code, ErrorCode::WhatsAppNotConfigured);
    let err: AppError = WhatsAppError::Rejected("boom".into()).into();
    assert_eq!(err.code, ErrorCode::WhatsAppSendFailed);
}

#[tokio::test]
async fn ultramsg_send() {
    let router = Router::new().route(
        "/instance42/messages/chat",
        post(|Form(form): Form<HashMap<String, String>>| async move {
            assert_eq!(form["token"], "tok");
            assert_eq!(form["to"], "+5511987654321");
            assert_eq!(form["body"], "oi");
            Json(serde_json::json!({ "sent": "true", "message": "ok", "id": 981 }))
        }),
    );
    let base = test_upstream::spawn(router).await;
    let client = WhatsAppClient::new(reqwest::Client::new(), &base, &base);

    let id = client
        .send(&integration(WhatsAppProvider::Ultramsg), "11987654321", "oi")
        .await
        .unwrap();
    assert_eq!(id, "981");
}

#[tokio::test]
async fn ultramsg_error_is_rejection() {
    let router = Router::new().route(
        "/instance42/messages/chat",
        post(|| async { Json(serde_json::json!({ "error": "Wrong token" })) }),
    );
    let base = test_upstream::spawn(router).await;
    let client = WhatsAppClient::new(reqwest::Client::new(), &base, &base);

    let err = client
        .send(&integration(WhatsAppProvider::Ultramsg), "11987654321", "oi")
        .await
        .unwrap_err();
    assert!(matches!(err, WhatsAppError::Rejected(_)));
}

#[tokio::test]
async fn twilio_send() {
    let router = Router::new().route(
        "/2010-04-01/Accounts/AC123/Messages.json",
        post(
            |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                let auth = headers["authorization"].to_str().unwrap().to_string();
                assert!(auth.starts_with("Basic "));
                assert_eq!(form["From"], "whatsapp:+14155550100");
                assert_eq!(form["To"], "whatsapp:+5511987654321");
                assert_eq!(form["Body"], "pedido pronto");
                (
                    http::StatusCode::CREATED,
                    Json(serde_json::json!({ "sid": "SM0001", "status": "queued" })),
                )
            },
        ),
    );
    let base = test_upstream::spawn(router).await;
    let client = WhatsAppClient::new(reqwest::Client::new(), &base, &base);

    let sid = client
        .send(
            &integration(WhatsAppProvider::Twilio),
            "(11) 98765-4321",
            "pedido pronto",
        )
        .await
        .unwrap();
    assert_eq!(sid, "SM0001");
}

#[tokio::test]
async fn disabled_or_incomplete_integration() {
    let client = WhatsAppClient::new(reqwest::Client::new(), "http://unused", "http://unused");

    let mut disabled = integration(WhatsAppProvider::Ultramsg);
    disabled.enabled = false;
    assert!(matches!(
        client.send(&disabled, "11987654321", "x").await,
        Err(WhatsAppError::NotConfigured)
    ));

    let mut missing = integration(WhatsAppProvider::Twilio);
    missing.auth_token = None;
    assert!(matches!(
        client.send(&missing, "11987654321", "x").await,
        Err(WhatsAppError::MissingCredential("auth_token"))
    ));
}
