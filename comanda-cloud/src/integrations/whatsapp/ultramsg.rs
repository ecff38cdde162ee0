//! UltraMsg REST API
//!
//! `POST {base}/{instance}/messages/chat` with form `token`, `to`, `body`.

use super::WhatsAppError;

pub(super) async fn send(
    http: &reqwest::Client,
    base: &str,
    instance_id: &str,
    token: &str,
    phone: &str,
    body: &str,
) -> Result<String, WhatsAppError> {
    let to = format!("+{phone}");
    let resp: serde_json::Value = http
        .post(format!("{base}/{instance_id}/messages/chat"))
        .form(&[("token", token), ("to", to.as_str()), ("body", body)])
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = resp.get("error") {
        return Err(WhatsAppError::Rejected(error.to_string()));
    }
    match &resp["id"] {
        serde_json::Value::String(id) => Ok(id.clone()),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        _ => Err(WhatsAppError::Rejected(format!("unexpected response: {resp}"))),
    }
}
