use shared::models::{IfoodIntegration, IfoodIntegrationUpdate};
use sqlx::PgPool;

const COLUMNS: &str =
    "restaurant_id, client_id, client_secret, merchant_id, enabled, auto_confirm, last_polled_at, updated_at";

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Option<IfoodIntegration>, sqlx::Error> {
    sqlx::query_as::<_, IfoodIntegration>(&format!(
        "SELECT {COLUMNS} FROM ifood_integrations WHERE restaurant_id = $1"
    ))
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_enabled(pool: &PgPool) -> Result<Vec<IfoodIntegration>, sqlx::Error> {
    sqlx::query_as::<_, IfoodIntegration>(&format!(
        "SELECT {COLUMNS} FROM ifood_integrations WHERE enabled"
    ))
    .fetch_all(pool)
    .await
}

/// Insert or update. A first insert needs the secret; later updates
/// keep the stored one when `client_secret` is `None`.
pub async fn upsert(
    pool: &PgPool,
    restaurant_id: i64,
    data: &IfoodIntegrationUpdate,
    now: i64,
) -> Result<IfoodIntegration, sqlx::Error> {
    sqlx::query_as::<_, IfoodIntegration>(&format!(
        "INSERT INTO ifood_integrations
            (restaurant_id, client_id, client_secret, merchant_id, enabled, auto_confirm, updated_at)
         VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7)
         ON CONFLICT (restaurant_id) DO UPDATE SET
            client_id = EXCLUDED.client_id,
            client_secret = COALESCE($3, ifood_integrations.client_secret),
            merchant_id = EXCLUDED.merchant_id,
            enabled = EXCLUDED.enabled,
            auto_confirm = EXCLUDED.auto_confirm,
            updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(data.client_id.trim())
    .bind(&data.client_secret)
    .bind(data.merchant_id.trim())
    .bind(data.enabled)
    .bind(data.auto_confirm)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn touch_polled(pool: &PgPool, restaurant_id: i64, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE ifood_integrations SET last_polled_at = $2 WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}
