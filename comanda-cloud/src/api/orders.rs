//! Orders and the PDV
//!
//! GET    /api/orders?status=&from=&to=&limit=&offset=
//! GET    /api/orders/{id}
//! PATCH  /api/orders/{id}/status
//! DELETE /api/orders/{id}
//! POST   /api/pdv/preview
//! POST   /api/pdv/finalize

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderDetail, OrderStatus, OrderStatusUpdate, PermissionModule};
use shared::pdv::{CartTotals, CheckoutRequest};

use super::{ApiResult, day_range, day_start_millis, parse_date};
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::db::orders::OrderFilter;
use crate::error::internal;
use crate::services::orders;
use crate::state::AppState;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<OrderStatus>,
    /// First day, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Last day (inclusive), `YYYY-MM-DD`
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl OrdersQuery {
    fn to_filter(&self) -> Result<OrderFilter, AppError> {
        let from = self
            .from
            .as_deref()
            .map(|d| parse_date(d, "from").map(day_start_millis))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|d| parse_date(d, "to").map(|date| day_range(date).1))
            .transpose()?;
        Ok(OrderFilter {
            status: self.status,
            from,
            to,
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    require_permission(&state, &identity, PermissionModule::Pedidos, false).await?;
    let filter = query.to_filter()?;
    let orders = db::orders::list(&state.pool, identity.restaurant_id, &filter)
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    require_permission(&state, &identity, PermissionModule::Pedidos, false).await?;
    let detail = db::orders::find_detail(&state.pool, identity.restaurant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(detail))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<OrderStatusUpdate>,
) -> ApiResult<Order> {
    require_permission(&state, &identity, PermissionModule::Pedidos, true).await?;
    let order = orders::change_status(&state, identity.restaurant_id, id, req.status).await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    require_permission(&state, &identity, PermissionModule::Pedidos, true).await?;
    orders::delete(&state, identity.restaurant_id, id).await?;
    Ok(Json(true))
}

pub async fn preview(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<CartTotals> {
    require_permission(&state, &identity, PermissionModule::Pdv, false).await?;
    let totals = orders::preview(&state, identity.restaurant_id, &req).await?;
    Ok(Json(totals))
}

pub async fn finalize(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<OrderDetail> {
    require_permission(&state, &identity, PermissionModule::Pdv, true).await?;
    let detail = orders::finalize(&state, identity.restaurant_id, req).await?;
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_capped() {
        let q = OrdersQuery {
            limit: Some(1_000),
            offset: Some(-5),
            ..Default::default()
        };
        let f = q.to_filter().unwrap();
        assert_eq!(f.limit, MAX_PAGE_SIZE);
        assert_eq!(f.offset, 0);

        let f = OrdersQuery::default().to_filter().unwrap();
        assert_eq!(f.limit, DEFAULT_PAGE_SIZE);
        assert!(f.from.is_none() && f.to.is_none());
    }

    #[test]
    fn date_range_includes_last_day() {
        let q = OrdersQuery {
            from: Some("2025-03-10".into()),
            to: Some("2025-03-10".into()),
            ..Default::default()
        };
        let f = q.to_filter().unwrap();
        assert_eq!(f.to.unwrap() - f.from.unwrap(), 24 * 60 * 60 * 1000);
    }

    #[test]
    fn status_filter_parses_from_query() {
        let q: OrdersQuery =
            serde_json::from_value(serde_json::json!({ "status": "saiu_entrega" })).unwrap();
        assert_eq!(q.status, Some(OrderStatus::SaiuEntrega));
        assert!(
            OrdersQuery {
                from: Some("ontem".into()),
                ..Default::default()
            }
            .to_filter()
            .is_err()
        );
    }
}
