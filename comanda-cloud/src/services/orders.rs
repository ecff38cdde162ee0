//! Order workflows
//!
//! Every mutation publishes a [`ChangeEvent`] after its transaction
//! commits. Customer notifications and iFood status forwarding run in
//! background tasks and never fail the request that triggered them.

use std::collections::HashMap;

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Mesa, MesaStatus, Order, OrderCreate, OrderDetail, OrderSource, OrderStatus, Product,
    Restaurant,
};
use shared::pdv::{Cart, CartTotals, CheckoutRequest};
use shared::realtime::{ChangeAction, ChangeEvent};
use shared::util::now_millis;

use crate::db;
use crate::error::{ServiceResult, is_unique_violation};
use crate::integrations::ifood::mapper::status_actions;
use crate::services::notify;
use crate::state::AppState;

/// Result of closing a mesa
#[derive(Debug, Clone, Serialize)]
pub struct MesaClosed {
    pub mesa: Mesa,
    /// Orders that were still open and are now delivered
    pub orders: Vec<Order>,
}

async fn load_restaurant(state: &AppState, restaurant_id: i64) -> ServiceResult<Restaurant> {
    Ok(db::restaurants::find(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?)
}

/// Rebuild the cart server-side from catalog prices
pub async fn build_cart(
    state: &AppState,
    restaurant: &Restaurant,
    req: &CheckoutRequest,
) -> ServiceResult<Cart> {
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    let ids: Vec<i64> = req.items.iter().map(|i| i.product_id).collect();
    let products: HashMap<i64, Product> = db::products::find_many(&state.pool, restaurant.id, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut cart = Cart::new();
    for item in &req.items {
        let product = products.get(&item.product_id).ok_or_else(|| {
            AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", item.product_id)
        })?;
        cart.add_item(product, item.quantity, item.note.as_deref())?;
    }
    cart.set_service_fee_percent(
        req.service_fee_percent
            .unwrap_or(restaurant.service_fee_percent),
    )?;
    cart.set_delivery_fee(req.delivery_fee)?;
    cart.set_discount(req.discount)?;
    Ok(cart)
}

/// Totals for a checkout without persisting anything
pub async fn preview(
    state: &AppState,
    restaurant_id: i64,
    req: &CheckoutRequest,
) -> ServiceResult<CartTotals> {
    let restaurant = load_restaurant(state, restaurant_id).await?;
    let cart = build_cart(state, &restaurant, req).await?;
    Ok(cart.totals())
}

/// Finalize a PDV sale.
///
/// A mesa order marks its mesa as occupied in the same transaction.
pub async fn finalize(
    state: &AppState,
    restaurant_id: i64,
    req: CheckoutRequest,
) -> ServiceResult<OrderDetail> {
    let restaurant = load_restaurant(state, restaurant_id).await?;
    let cart = build_cart(state, &restaurant, &req).await?;
    let create = cart.to_order(req.meta)?;

    if let Some(mesa_id) = create.mesa_id {
        let mesa = db::mesas::find(&state.pool, restaurant_id, mesa_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::MesaNotFound).with_detail("mesa_id", mesa_id))?;
        if !mesa.is_active {
            return Err(AppError::with_message(
                ErrorCode::MesaNotFound,
                format!("Mesa {} is inactive", mesa.number),
            )
            .into());
        }
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;
    let detail = db::orders::insert(&mut *tx, restaurant_id, &create, now).await?;
    let mesa = match create.mesa_id {
        Some(mesa_id) => {
            db::mesas::set_status(&mut *tx, restaurant_id, mesa_id, MesaStatus::Ocupada).await?
        }
        None => None,
    };
    tx.commit().await?;

    state.realtime.publish(ChangeEvent::for_row(
        "orders",
        ChangeAction::Insert,
        restaurant_id,
        &detail,
    ));
    if let Some(mesa) = &mesa {
        state.realtime.publish(ChangeEvent::for_row(
            "mesas",
            ChangeAction::Update,
            restaurant_id,
            mesa,
        ));
    }

    tracing::info!(
        restaurant_id,
        order_id = detail.order.id,
        number = detail.order.number,
        total = detail.order.total,
        "PDV order finalized"
    );
    Ok(detail)
}

/// Update the status and notify the customer
async fn apply_status(
    state: &AppState,
    restaurant_id: i64,
    order_id: i64,
    status: OrderStatus,
) -> ServiceResult<Order> {
    let mut conn = state.pool.acquire().await?;
    let order = db::orders::update_status(&mut *conn, restaurant_id, order_id, status, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    state.realtime.publish(ChangeEvent::for_row(
        "orders",
        ChangeAction::Update,
        restaurant_id,
        &order,
    ));
    notify::spawn_status_notification(state.clone(), restaurant_id, order.clone());
    Ok(order)
}

/// Status change from the dashboard.
///
/// iFood orders get the matching merchant action forwarded.
pub async fn change_status(
    state: &AppState,
    restaurant_id: i64,
    order_id: i64,
    status: OrderStatus,
) -> ServiceResult<Order> {
    let order = apply_status(state, restaurant_id, order_id, status).await?;
    tracing::info!(restaurant_id, order_id, status = %status, "Order status changed");

    if order.source == OrderSource::Ifood
        && let Some(external_id) = order.external_id.clone()
    {
        spawn_ifood_forward(state.clone(), restaurant_id, external_id, status);
    }
    Ok(order)
}

fn spawn_ifood_forward(
    state: AppState,
    restaurant_id: i64,
    external_id: String,
    status: OrderStatus,
) {
    tokio::spawn(async move {
        if let Err(e) = forward_to_ifood(&state, restaurant_id, &external_id, status).await {
            let err: AppError = e.into();
            tracing::warn!(
                restaurant_id,
                external_id = %external_id,
                "iFood status forward failed: {}",
                err.message
            );
        }
    });
}

async fn forward_to_ifood(
    state: &AppState,
    restaurant_id: i64,
    external_id: &str,
    status: OrderStatus,
) -> ServiceResult<()> {
    let Some(integration) = db::ifood::find(&state.pool, restaurant_id)
        .await?
        .filter(|i| i.enabled)
    else {
        return Ok(());
    };
    for action in status_actions(status, integration.auto_confirm) {
        state
            .ifood
            .perform(&integration, external_id, action)
            .await
            .map_err(AppError::from)?;
    }
    Ok(())
}

/// Close a mesa: open orders become delivered and the mesa is freed
pub async fn close_mesa(
    state: &AppState,
    restaurant_id: i64,
    mesa_id: i64,
) -> ServiceResult<MesaClosed> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;
    let mesa = db::mesas::set_status(&mut *tx, restaurant_id, mesa_id, MesaStatus::Livre)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MesaNotFound))?;
    let orders = db::orders::close_open_for_mesa(&mut *tx, restaurant_id, mesa_id, now).await?;
    tx.commit().await?;

    state.realtime.publish(ChangeEvent::for_row(
        "mesas",
        ChangeAction::Update,
        restaurant_id,
        &mesa,
    ));
    for order in &orders {
        state.realtime.publish(ChangeEvent::for_row(
            "orders",
            ChangeAction::Update,
            restaurant_id,
            order,
        ));
    }

    tracing::info!(restaurant_id, mesa_id, closed = orders.len(), "Mesa closed");
    Ok(MesaClosed { mesa, orders })
}

/// Import a marketplace order.
///
/// Returns `None` when an order with the same external id already exists.
pub async fn import_external(
    state: &AppState,
    restaurant_id: i64,
    create: &OrderCreate,
) -> ServiceResult<Option<OrderDetail>> {
    let Some(external_id) = create.external_id.as_deref() else {
        return Err(AppError::new(ErrorCode::RequiredField)
            .with_detail("field", "external_id")
            .into());
    };

    let mut tx = state.pool.begin().await?;
    if db::orders::find_by_external(&mut *tx, restaurant_id, external_id)
        .await?
        .is_some()
    {
        return Ok(None);
    }
    let detail = match db::orders::insert(&mut *tx, restaurant_id, create, now_millis()).await {
        Ok(detail) => detail,
        // a concurrent import won the race
        Err(e) if is_unique_violation(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    state.realtime.publish(ChangeEvent::for_row(
        "orders",
        ChangeAction::Insert,
        restaurant_id,
        &detail,
    ));
    tracing::info!(
        restaurant_id,
        order_id = detail.order.id,
        external_id,
        "External order imported"
    );
    Ok(Some(detail))
}

/// Cancel an order the marketplace cancelled.
///
/// Returns `None` for unknown or already cancelled orders.
pub async fn cancel_external(
    state: &AppState,
    restaurant_id: i64,
    external_id: &str,
) -> ServiceResult<Option<Order>> {
    let existing = {
        let mut conn = state.pool.acquire().await?;
        db::orders::find_by_external(&mut *conn, restaurant_id, external_id).await?
    };
    let Some(order) = existing.filter(|o| o.status != OrderStatus::Cancelado) else {
        return Ok(None);
    };
    let order = apply_status(state, restaurant_id, order.id, OrderStatus::Cancelado).await?;
    tracing::info!(restaurant_id, order_id = order.id, external_id, "External order cancelled");
    Ok(Some(order))
}

pub async fn delete(state: &AppState, restaurant_id: i64, order_id: i64) -> ServiceResult<()> {
    if !db::orders::delete(&state.pool, restaurant_id, order_id).await? {
        return Err(AppError::new(ErrorCode::OrderNotFound).into());
    }
    state
        .realtime
        .publish(ChangeEvent::deleted("orders", restaurant_id, order_id));
    tracing::info!(restaurant_id, order_id, "Order deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use shared::models::OrderType;
    use shared::pdv::{CheckoutItem, OrderMeta};
    use sqlx::PgPool;

    fn checkout(product_id: i64, quantity: i32, meta: OrderMeta) -> CheckoutRequest {
        CheckoutRequest {
            meta,
            items: vec![CheckoutItem {
                product_id,
                quantity,
                note: None,
            }],
            discount: 0.0,
            service_fee_percent: None,
            delivery_fee: 0.0,
        }
    }

    fn at_mesa(mesa_id: i64) -> OrderMeta {
        OrderMeta {
            order_type: OrderType::Mesa,
            mesa_id: Some(mesa_id),
            ..OrderMeta::default()
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn finalize_numbers_orders_and_occupies_mesa(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, _) = fixtures::restaurant(&pool, "cantina").await;
        let rid = restaurant.id;
        let category = fixtures::category(&pool, rid, "Lanches").await;
        let product = fixtures::product(&pool, rid, category.id, 12.5).await;
        let mesa = fixtures::mesa(&pool, rid, None, 3).await;
        let mut feed = state.realtime.subscribe(rid);

        let first = finalize(&state, rid, checkout(product.id, 2, at_mesa(mesa.id)))
            .await
            .unwrap();
        assert_eq!(first.order.number, 1);
        assert_eq!(first.order.status, OrderStatus::Pendente);
        assert_eq!(first.order.total, 25.0);
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.items[0].unit_price, 12.5);

        let stored = db::mesas::find(&pool, rid, mesa.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MesaStatus::Ocupada);

        let inserted = feed.try_recv().unwrap();
        assert_eq!(inserted.table, "orders");
        assert_eq!(inserted.action, ChangeAction::Insert);
        assert_eq!(feed.try_recv().unwrap().table, "mesas");

        let second = finalize(&state, rid, checkout(product.id, 1, OrderMeta::default()))
            .await
            .unwrap();
        assert_eq!(second.order.number, 2);
        assert_eq!(second.order.mesa_id, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn finalize_rejects_foreign_product(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (ours, _) = fixtures::restaurant(&pool, "ours").await;
        let (theirs, _) = fixtures::restaurant(&pool, "theirs").await;
        let category = fixtures::category(&pool, theirs.id, "Bebidas").await;
        let product = fixtures::product(&pool, theirs.id, category.id, 5.0).await;

        let err: AppError = finalize(&state, ours.id, checkout(product.id, 1, OrderMeta::default()))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn close_mesa_delivers_open_orders(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, _) = fixtures::restaurant(&pool, "bistro").await;
        let rid = restaurant.id;
        let category = fixtures::category(&pool, rid, "Pratos").await;
        let product = fixtures::product(&pool, rid, category.id, 30.0).await;
        let mesa = fixtures::mesa(&pool, rid, None, 7).await;

        let a = finalize(&state, rid, checkout(product.id, 1, at_mesa(mesa.id)))
            .await
            .unwrap();
        let b = finalize(&state, rid, checkout(product.id, 2, at_mesa(mesa.id)))
            .await
            .unwrap();
        let cancelled = finalize(&state, rid, checkout(product.id, 1, at_mesa(mesa.id)))
            .await
            .unwrap();
        change_status(&state, rid, cancelled.order.id, OrderStatus::Cancelado)
            .await
            .unwrap();

        let closed = close_mesa(&state, rid, mesa.id).await.unwrap();
        assert_eq!(closed.mesa.status, MesaStatus::Livre);
        let mut ids: Vec<i64> = closed.orders.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        let mut expected = vec![a.order.id, b.order.id];
        expected.sort_unstable();
        assert_eq!(ids, expected);
        assert!(closed.orders.iter().all(|o| o.status == OrderStatus::Entregue));

        let still_cancelled = db::orders::find(&pool, rid, cancelled.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(still_cancelled.status, OrderStatus::Cancelado);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn close_unknown_mesa_is_not_found(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, _) = fixtures::restaurant(&pool, "vazio").await;

        let err: AppError = close_mesa(&state, restaurant.id, 42).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::MesaNotFound);
    }
}
