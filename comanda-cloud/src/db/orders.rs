//! Orders and order items

use shared::models::{Order, OrderCreate, OrderDetail, OrderItem, OrderStatus};
use shared::util::snowflake_id;
use sqlx::{PgConnection, PgPool};

use super::restaurants;

const COLUMNS: &str = "id, number, source, order_type, status, mesa_id, customer_name, \
     customer_phone, delivery_address, payment_method, subtotal, discount, service_fee, \
     delivery_fee, total, notes, external_id, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, unit_price, quantity, note, subtotal";

/// Listing filter; `from`/`to` are Unix millis, `to` exclusive
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    filter: &OrderFilter,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders
         WHERE restaurant_id = $1
           AND ($2::order_status IS NULL OR status = $2)
           AND ($3::BIGINT IS NULL OR created_at >= $3)
           AND ($4::BIGINT IS NULL OR created_at < $4)
         ORDER BY created_at DESC
         LIMIT $5 OFFSET $6"
    ))
    .bind(restaurant_id)
    .bind(filter.status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE restaurant_id = $1 AND id = $2"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_external(
    conn: &mut PgConnection,
    restaurant_id: i64,
    external_id: &str,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE restaurant_id = $1 AND external_id = $2"
    ))
    .bind(restaurant_id)
    .bind(external_id)
    .fetch_optional(conn)
    .await
}

pub async fn items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await
}

pub async fn find_detail(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<OrderDetail>, sqlx::Error> {
    let Some(order) = find(pool, restaurant_id, id).await? else {
        return Ok(None);
    };
    let items = items(pool, order.id).await?;
    Ok(Some(OrderDetail { order, items }))
}

/// Insert an order and its lines; the caller owns the transaction.
///
/// The order number comes from the restaurant's sequence.
pub async fn insert(
    conn: &mut PgConnection,
    restaurant_id: i64,
    data: &OrderCreate,
    now: i64,
) -> Result<OrderDetail, sqlx::Error> {
    let number = restaurants::next_order_number(&mut *conn, restaurant_id).await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (
            id, restaurant_id, number, source, order_type, status, mesa_id,
            customer_name, customer_phone, delivery_address, payment_method,
            subtotal, discount, service_fee, delivery_fee, total, notes, external_id,
            created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $19)
         RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(restaurant_id)
    .bind(number)
    .bind(data.source)
    .bind(data.order_type)
    .bind(data.status)
    .bind(data.mesa_id)
    .bind(&data.customer_name)
    .bind(&data.customer_phone)
    .bind(&data.delivery_address)
    .bind(data.payment_method)
    .bind(data.subtotal)
    .bind(data.discount)
    .bind(data.service_fee)
    .bind(data.delivery_fee)
    .bind(data.total)
    .bind(&data.notes)
    .bind(&data.external_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(data.items.len());
    for item in &data.items {
        let row = sqlx::query_as::<_, OrderItem>(&format!(
            "INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity, note, subtotal)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(order.id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(&item.note)
        .bind(item.subtotal)
        .fetch_one(&mut *conn)
        .await?;
        items.push(row);
    }

    Ok(OrderDetail { order, items })
}

pub async fn update_status(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = $3, updated_at = $4
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(status)
    .bind(now)
    .fetch_optional(conn)
    .await
}

/// Mark every open order on a mesa as delivered
pub async fn close_open_for_mesa(
    conn: &mut PgConnection,
    restaurant_id: i64,
    mesa_id: i64,
    now: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = 'entregue', updated_at = $3
         WHERE restaurant_id = $1 AND mesa_id = $2
           AND status NOT IN ('entregue', 'cancelado')
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(mesa_id)
    .bind(now)
    .fetch_all(conn)
    .await
}

pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE restaurant_id = $1 AND id = $2")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
