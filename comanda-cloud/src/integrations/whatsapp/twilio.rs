//! Twilio Messages API (WhatsApp channel)
//!
//! `POST {base}/2010-04-01/Accounts/{sid}/Messages.json`, Basic auth
//! `sid:auth_token`, form `From`, `To`, `Body` with `whatsapp:` prefixes.

use super::WhatsAppError;

pub(super) async fn send(
    http: &reqwest::Client,
    base: &str,
    account_sid: &str,
    auth_token: &str,
    from: &str,
    phone: &str,
    body: &str,
) -> Result<String, WhatsAppError> {
    let from = format!("whatsapp:+{from}");
    let to = format!("whatsapp:+{phone}");
    let resp = http
        .post(format!("{base}/2010-04-01/Accounts/{account_sid}/Messages.json"))
        .basic_auth(account_sid, Some(auth_token))
        .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", body)])
        .send()
        .await?;

    let status = resp.status();
    let json: serde_json::Value = resp.json().await?;
    if !status.is_success() {
        let message = json["message"].as_str().unwrap_or("unknown error");
        return Err(WhatsAppError::Rejected(format!("{status}: {message}")));
    }
    json["sid"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| WhatsAppError::Rejected(format!("unexpected response: {json}")))
}
