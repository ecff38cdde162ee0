//! Daily dashboard aggregates

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::OrderStatus;
use shared::pdv::money::{round_money, to_decimal, to_f64};
use sqlx::PgPool;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub order_count: i64,
    /// Sum of non-cancelled totals
    pub revenue: f64,
    pub average_ticket: f64,
    pub by_status: Vec<StatusCount>,
    pub top_products: Vec<TopProduct>,
    pub mesas_occupied: i64,
    pub mesas_total: i64,
}

/// Aggregates for `[from, to)` (Unix millis)
pub async fn summary(
    pool: &PgPool,
    restaurant_id: i64,
    from: i64,
    to: i64,
) -> Result<DashboardSummary, BoxError> {
    let (order_count, revenue, paid_count): (i64, f64, i64) = sqlx::query_as(
        "SELECT
            COUNT(*),
            COALESCE(SUM(total) FILTER (WHERE status <> 'cancelado'), 0)::DOUBLE PRECISION,
            COUNT(*) FILTER (WHERE status <> 'cancelado')
         FROM orders
         WHERE restaurant_id = $1 AND created_at >= $2 AND created_at < $3",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    let status_rows: Vec<(OrderStatus, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM orders
         WHERE restaurant_id = $1 AND created_at >= $2 AND created_at < $3
         GROUP BY status",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let top_products = sqlx::query_as::<_, TopProduct>(
        "SELECT i.product_name,
                SUM(i.quantity)::BIGINT AS quantity,
                SUM(i.subtotal)::DOUBLE PRECISION AS revenue
         FROM order_items i
         JOIN orders o ON o.id = i.order_id
         WHERE o.restaurant_id = $1 AND o.created_at >= $2 AND o.created_at < $3
           AND o.status <> 'cancelado'
         GROUP BY i.product_name
         ORDER BY quantity DESC, revenue DESC
         LIMIT 5",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let (mesas_occupied, mesas_total): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*) FILTER (WHERE status = 'ocupada'), COUNT(*)
         FROM mesas WHERE restaurant_id = $1 AND is_active",
    )
    .bind(restaurant_id)
    .fetch_one(pool)
    .await?;

    Ok(DashboardSummary {
        order_count,
        revenue,
        average_ticket: average_ticket(revenue, paid_count),
        by_status: status_rows
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        top_products,
        mesas_occupied,
        mesas_total,
    })
}

fn average_ticket(revenue: f64, count: i64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    to_f64(round_money(to_decimal(revenue) / Decimal::from(count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_ticket_rounds_to_cents() {
        assert_eq!(average_ticket(0.0, 0), 0.0);
        assert_eq!(average_ticket(100.0, 3), 33.33);
        assert_eq!(average_ticket(57.5, 1), 57.5);
    }
}
