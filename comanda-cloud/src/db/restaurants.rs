use shared::models::{Restaurant, RestaurantUpdate};
use sqlx::{PgConnection, PgPool};

pub(crate) const COLUMNS: &str = "id, name, slug, phone, address, logo_url, menu_theme, is_open, \
     service_fee_percent, created_at";

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!("SELECT {COLUMNS} FROM restaurants WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {COLUMNS} FROM restaurants WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM restaurants WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &RestaurantUpdate,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        "UPDATE restaurants SET
            name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            address = COALESCE($4, address),
            logo_url = COALESCE($5, logo_url),
            menu_theme = COALESCE($6, menu_theme),
            is_open = COALESCE($7, is_open),
            service_fee_percent = COALESCE($8, service_fee_percent)
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(&data.logo_url)
    .bind(data.menu_theme)
    .bind(data.is_open)
    .bind(data.service_fee_percent)
    .fetch_optional(pool)
    .await
}

/// Next per-restaurant order number (row-locked increment)
pub async fn next_order_number(
    conn: &mut PgConnection,
    restaurant_id: i64,
) -> Result<i32, sqlx::Error> {
    let (seq,): (i32,) = sqlx::query_as(
        "UPDATE restaurants SET order_seq = order_seq + 1 WHERE id = $1 RETURNING order_seq",
    )
    .bind(restaurant_id)
    .fetch_one(conn)
    .await?;
    Ok(seq)
}
