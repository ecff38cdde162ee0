use shared::models::{Plan, Subscription, SubscriptionStatus};
use sqlx::{PgConnection, PgPool};

const COLUMNS: &str = "id, restaurant_id, plan, status, provider_customer_id, \
     provider_subscription_id, current_period_end, created_at, updated_at";

pub async fn find(pool: &PgPool, restaurant_id: i64) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {COLUMNS} FROM subscriptions WHERE restaurant_id = $1"
    ))
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn set_customer_id(
    pool: &PgPool,
    restaurant_id: i64,
    customer_id: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE subscriptions SET provider_customer_id = $2, updated_at = $3
         WHERE restaurant_id = $1",
    )
    .bind(restaurant_id)
    .bind(customer_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub struct ProviderSubscription<'a> {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub subscription_id: &'a str,
    pub current_period_end: Option<i64>,
    pub now: i64,
}

pub async fn activate(
    pool: &PgPool,
    restaurant_id: i64,
    sub: &ProviderSubscription<'_>,
) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        "UPDATE subscriptions SET
            plan = $2, status = $3, provider_subscription_id = $4,
            current_period_end = COALESCE($5, current_period_end), updated_at = $6
         WHERE restaurant_id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(sub.plan)
    .bind(sub.status)
    .bind(sub.subscription_id)
    .bind(sub.current_period_end)
    .bind(sub.now)
    .fetch_optional(pool)
    .await
}

pub async fn set_status(
    pool: &PgPool,
    restaurant_id: i64,
    status: SubscriptionStatus,
    now: i64,
) -> Result<Option<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(&format!(
        "UPDATE subscriptions SET status = $2, updated_at = $3
         WHERE restaurant_id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(status)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Status update keyed by the provider's subscription id.
///
/// Returns the restaurant id, `None` for unknown subscriptions.
pub async fn update_by_provider_id(
    conn: &mut PgConnection,
    provider_subscription_id: &str,
    status: SubscriptionStatus,
    current_period_end: Option<i64>,
    now: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "UPDATE subscriptions SET
            status = $2, current_period_end = COALESCE($3, current_period_end), updated_at = $4
         WHERE provider_subscription_id = $1
         RETURNING restaurant_id",
    )
    .bind(provider_subscription_id)
    .bind(status)
    .bind(current_period_end)
    .bind(now)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|r| r.0))
}

/// Record a webhook event id; `false` when it was already processed
pub async fn mark_event_processed(
    conn: &mut PgConnection,
    event_id: &str,
    event_type: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type, processed_at)
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
