use shared::models::{
    MessageStatus, WhatsAppIntegration, WhatsAppIntegrationUpdate, WhatsAppMessage,
};
use shared::util::snowflake_id;
use sqlx::PgPool;

const COLUMNS: &str = "restaurant_id, provider, instance_id, token, account_sid, auth_token, \
     from_number, enabled, updated_at";

const MESSAGE_COLUMNS: &str =
    "id, to_phone, body, status, provider_message_id, error, order_id, created_at";

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Option<WhatsAppIntegration>, sqlx::Error> {
    sqlx::query_as::<_, WhatsAppIntegration>(&format!(
        "SELECT {COLUMNS} FROM whatsapp_integrations WHERE restaurant_id = $1"
    ))
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Insert or update; `None` secrets keep what is stored
pub async fn upsert(
    pool: &PgPool,
    restaurant_id: i64,
    data: &WhatsAppIntegrationUpdate,
    now: i64,
) -> Result<WhatsAppIntegration, sqlx::Error> {
    sqlx::query_as::<_, WhatsAppIntegration>(&format!(
        "INSERT INTO whatsapp_integrations
            (restaurant_id, provider, instance_id, token, account_sid, auth_token, from_number, enabled, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (restaurant_id) DO UPDATE SET
            provider = EXCLUDED.provider,
            instance_id = EXCLUDED.instance_id,
            token = COALESCE(EXCLUDED.token, whatsapp_integrations.token),
            account_sid = EXCLUDED.account_sid,
            auth_token = COALESCE(EXCLUDED.auth_token, whatsapp_integrations.auth_token),
            from_number = EXCLUDED.from_number,
            enabled = EXCLUDED.enabled,
            updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(data.provider)
    .bind(&data.instance_id)
    .bind(&data.token)
    .bind(&data.account_sid)
    .bind(&data.auth_token)
    .bind(&data.from_number)
    .bind(data.enabled)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub struct NewMessage<'a> {
    pub to_phone: &'a str,
    pub body: &'a str,
    pub status: MessageStatus,
    pub provider_message_id: Option<&'a str>,
    pub error: Option<&'a str>,
    pub order_id: Option<i64>,
    pub now: i64,
}

pub async fn log_message(
    pool: &PgPool,
    restaurant_id: i64,
    msg: &NewMessage<'_>,
) -> Result<WhatsAppMessage, sqlx::Error> {
    sqlx::query_as::<_, WhatsAppMessage>(&format!(
        "INSERT INTO whatsapp_messages
            (id, restaurant_id, to_phone, body, status, provider_message_id, error, order_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(restaurant_id)
    .bind(msg.to_phone)
    .bind(msg.body)
    .bind(msg.status)
    .bind(msg.provider_message_id)
    .bind(msg.error)
    .bind(msg.order_id)
    .bind(msg.now)
    .fetch_one(pool)
    .await
}

pub async fn list_messages(
    pool: &PgPool,
    restaurant_id: i64,
    limit: i64,
) -> Result<Vec<WhatsAppMessage>, sqlx::Error> {
    sqlx::query_as::<_, WhatsAppMessage>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM whatsapp_messages
         WHERE restaurant_id = $1
         ORDER BY created_at DESC
         LIMIT $2"
    ))
    .bind(restaurant_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
