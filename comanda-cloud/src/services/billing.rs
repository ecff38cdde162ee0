//! Subscriptions and plan limits

use shared::error::{AppError, ErrorCode};
use shared::models::{Plan, SubscribeRequest, Subscription, SubscriptionStatus};
use shared::util::now_millis;

use crate::db;
use crate::db::subscriptions::ProviderSubscription;
use crate::error::ServiceResult;
use crate::integrations::pagarme::WebhookEvent;
use crate::state::AppState;

/// Plan of a subscription that still grants access.
///
/// A trial past its period end counts as blocked.
pub fn usable_plan(sub: &Subscription, now: i64) -> Result<Plan, AppError> {
    let trial_over = sub.status == SubscriptionStatus::Trialing
        && sub.current_period_end.is_some_and(|end| end < now);
    if !sub.status.is_usable() || trial_over {
        return Err(AppError::with_message(
            ErrorCode::SubscriptionBlocked,
            format!("Subscription is {:?}", sub.status).to_lowercase(),
        ));
    }
    Ok(sub.plan)
}

/// Refuse when `current` already reached the plan's limit
pub fn check_limit(limit: Option<i64>, current: i64, resource: &str) -> Result<(), AppError> {
    match limit {
        Some(max) if current >= max => Err(AppError::with_message(
            ErrorCode::PlanLimitReached,
            format!("Plan allows at most {max} {resource}"),
        )
        .with_detail("resource", resource)
        .with_detail("limit", max)),
        _ => Ok(()),
    }
}

pub async fn active_plan(state: &AppState, restaurant_id: i64) -> ServiceResult<Plan> {
    let sub = db::subscriptions::find(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoSubscription))?;
    Ok(usable_plan(&sub, now_millis())?)
}

pub async fn ensure_product_capacity(state: &AppState, restaurant_id: i64) -> ServiceResult<()> {
    let plan = active_plan(state, restaurant_id).await?;
    let count = db::products::count_active(&state.pool, restaurant_id).await?;
    Ok(check_limit(plan.max_products(), count, "products")?)
}

pub async fn ensure_employee_capacity(state: &AppState, restaurant_id: i64) -> ServiceResult<()> {
    let plan = active_plan(state, restaurant_id).await?;
    let count = db::employees::count_active(&state.pool, restaurant_id).await?;
    Ok(check_limit(plan.max_employees(), count, "employees")?)
}

fn validate_subscribe(req: &SubscribeRequest) -> Result<(), AppError> {
    for (field, value) in [
        ("card_token", &req.card_token),
        ("customer_name", &req.customer_name),
        ("customer_email", &req.customer_email),
        ("customer_document", &req.customer_document),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", field));
        }
    }
    Ok(())
}

/// Subscribe (or switch plan) with a tokenized card.
///
/// The provider customer is created once and reused. A previous live
/// provider subscription is cancelled after the new one exists.
pub async fn subscribe(
    state: &AppState,
    restaurant_id: i64,
    req: &SubscribeRequest,
) -> ServiceResult<Subscription> {
    validate_subscribe(req)?;
    let current = db::subscriptions::find(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoSubscription))?;

    let customer_id = match current.provider_customer_id.clone() {
        Some(id) => id,
        None => {
            let id = state
                .pagarme
                .create_customer(req)
                .await
                .map_err(AppError::from)?;
            db::subscriptions::set_customer_id(&state.pool, restaurant_id, &id, now_millis())
                .await?;
            id
        }
    };

    let card_id = state
        .pagarme
        .create_card(&customer_id, &req.card_token)
        .await
        .map_err(AppError::from)?;
    let created = state
        .pagarme
        .create_subscription(restaurant_id, &customer_id, &card_id, req.plan)
        .await
        .map_err(AppError::from)?;

    if let Some(old_id) = current.provider_subscription_id.as_deref()
        && current.status != SubscriptionStatus::Canceled
        && old_id != created.id
        && let Err(e) = state.pagarme.cancel_subscription(old_id).await
    {
        tracing::warn!(restaurant_id, subscription_id = old_id, error = %e, "Failed to cancel previous subscription");
    }

    let sub = db::subscriptions::activate(
        &state.pool,
        restaurant_id,
        &ProviderSubscription {
            plan: req.plan,
            status: created.status,
            subscription_id: &created.id,
            current_period_end: created.current_period_end,
            now: now_millis(),
        },
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::NoSubscription))?;

    tracing::info!(
        restaurant_id,
        plan = req.plan.as_str(),
        subscription_id = %created.id,
        "Subscription created"
    );
    Ok(sub)
}

pub async fn cancel(state: &AppState, restaurant_id: i64) -> ServiceResult<Subscription> {
    let current = db::subscriptions::find(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoSubscription))?;
    let Some(provider_id) = current.provider_subscription_id.as_deref() else {
        return Err(AppError::with_message(
            ErrorCode::NoSubscription,
            "No paid subscription to cancel",
        )
        .into());
    };

    state
        .pagarme
        .cancel_subscription(provider_id)
        .await
        .map_err(AppError::from)?;
    let sub = db::subscriptions::set_status(
        &state.pool,
        restaurant_id,
        SubscriptionStatus::Canceled,
        now_millis(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::NoSubscription))?;

    tracing::info!(restaurant_id, subscription_id = provider_id, "Subscription canceled");
    Ok(sub)
}

/// Apply a provider webhook event.
///
/// Returns `false` when the event id was already processed.
pub async fn apply_webhook(state: &AppState, event: &WebhookEvent) -> ServiceResult<bool> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;
    if !db::subscriptions::mark_event_processed(&mut *tx, &event.id, &event.event_type, now)
        .await?
    {
        tracing::debug!(event_id = %event.id, "Duplicate webhook event, skipping");
        return Ok(false);
    }

    let Some(change) = event.subscription_change() else {
        tx.commit().await?;
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok(true);
    };
    let updated = db::subscriptions::update_by_provider_id(
        &mut *tx,
        &change.subscription_id,
        change.status,
        change.current_period_end,
        now,
    )
    .await?;
    // the event id is only recorded once the change is stored
    tx.commit().await?;

    match updated {
        Some(restaurant_id) => tracing::info!(
            restaurant_id,
            event_type = %event.event_type,
            status = ?change.status,
            "Subscription updated from webhook"
        ),
        None => tracing::warn!(
            subscription_id = %change.subscription_id,
            "Webhook for unknown subscription"
        ),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(status: SubscriptionStatus, period_end: Option<i64>) -> Subscription {
        Subscription {
            id: 1,
            restaurant_id: 1,
            plan: Plan::Profissional,
            status,
            provider_customer_id: None,
            provider_subscription_id: None,
            current_period_end: period_end,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn trial_within_period_is_usable() {
        let sub = subscription(SubscriptionStatus::Trialing, Some(2_000));
        assert_eq!(usable_plan(&sub, 1_000).unwrap(), Plan::Profissional);
    }

    #[test]
    fn expired_trial_is_blocked() {
        let sub = subscription(SubscriptionStatus::Trialing, Some(500));
        assert_eq!(
            usable_plan(&sub, 1_000).unwrap_err().code,
            ErrorCode::SubscriptionBlocked
        );
    }

    #[test]
    fn canceled_and_unpaid_are_blocked() {
        for status in [SubscriptionStatus::Canceled, SubscriptionStatus::Unpaid] {
            let err = usable_plan(&subscription(status, None), 0).unwrap_err();
            assert_eq!(err.code, ErrorCode::SubscriptionBlocked);
        }
        assert!(usable_plan(&subscription(SubscriptionStatus::PastDue, None), 0).is_ok());
    }

    #[test]
    fn limits() {
        assert!(check_limit(Some(3), 2, "employees").is_ok());
        let err = check_limit(Some(3), 3, "employees").unwrap_err();
        assert_eq!(err.code, ErrorCode::PlanLimitReached);
        assert!(check_limit(None, 10_000, "products").is_ok());
    }

    #[test]
    fn subscribe_requires_card_and_customer() {
        let mut req = SubscribeRequest {
            plan: Plan::Basico,
            card_token: "card_tok".into(),
            customer_name: "Maria".into(),
            customer_email: "maria@example.com".into(),
            customer_document: "123.456.789-09".into(),
        };
        assert!(validate_subscribe(&req).is_ok());
        req.card_token = " ".into();
        let err = validate_subscribe(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    async fn paid_restaurant(pool: &sqlx::PgPool, slug: &str, subscription_id: &str) -> i64 {
        let (restaurant, _) = crate::db::fixtures::restaurant(pool, slug).await;
        let sub = ProviderSubscription {
            plan: Plan::Profissional,
            status: SubscriptionStatus::Active,
            subscription_id,
            current_period_end: None,
            now: now_millis(),
        };
        db::subscriptions::activate(pool, restaurant.id, &sub)
            .await
            .unwrap();
        restaurant.id
    }

    fn event(id: &str, kind: &str, data: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(serde_json::json!({ "id": id, "type": kind, "data": data })).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_webhook_is_applied_once(pool: sqlx::PgPool) {
        let rid = paid_restaurant(&pool, "pizzaria", "sub_1").await;
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");

        let canceled = event(
            "hook_1",
            "subscription.canceled",
            serde_json::json!({ "id": "sub_1", "status": "canceled" }),
        );
        assert!(apply_webhook(&state, &canceled).await.unwrap());
        let sub = db::subscriptions::find(&pool, rid).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Canceled);

        // same event id with a different payload is still a redelivery
        let replay = event(
            "hook_1",
            "invoice.paid",
            serde_json::json!({ "subscription": { "id": "sub_1" } }),
        );
        assert!(!apply_webhook(&state, &replay).await.unwrap());
        let sub = db::subscriptions::find(&pool, rid).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Canceled);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn failed_update_leaves_event_unprocessed(pool: sqlx::PgPool) {
        let rid = paid_restaurant(&pool, "padaria", "sub_2").await;
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let failed = event(
            "hook_2",
            "invoice.payment_failed",
            serde_json::json!({ "subscription": { "id": "sub_2" } }),
        );

        sqlx::query("ALTER TABLE subscriptions RENAME TO subscriptions_away")
            .execute(&pool)
            .await
            .unwrap();
        assert!(apply_webhook(&state, &failed).await.is_err());
        sqlx::query("ALTER TABLE subscriptions_away RENAME TO subscriptions")
            .execute(&pool)
            .await
            .unwrap();

        // the provider retries and the change lands
        assert!(apply_webhook(&state, &failed).await.unwrap());
        let sub = db::subscriptions::find(&pool, rid).await.unwrap().unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unrelated_events_are_recorded(pool: sqlx::PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let charge = event("hook_3", "charge.created", serde_json::json!({}));

        assert!(apply_webhook(&state, &charge).await.unwrap());
        assert!(!apply_webhook(&state, &charge).await.unwrap());
    }
}
