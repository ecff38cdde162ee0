use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::snowflake_id;
use sqlx::PgPool;

const COLUMNS: &str =
    "id, category_id, name, description, price, image_url, sort_order, is_available, is_active";

/// Dashboard listing, optionally narrowed to one category
pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    category_id: Option<i64>,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products
         WHERE restaurant_id = $1 AND ($2::BIGINT IS NULL OR category_id = $2)
         ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .bind(category_id)
    .fetch_all(pool)
    .await
}

/// Active products, for the public menu
pub async fn list_active(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products
         WHERE restaurant_id = $1 AND is_active
         ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products WHERE restaurant_id = $1 AND id = $2"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Batch lookup; ids of other restaurants are silently absent
pub async fn find_many(
    pool: &PgPool,
    restaurant_id: i64,
    ids: &[i64],
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products WHERE restaurant_id = $1 AND id = ANY($2)"
    ))
    .bind(restaurant_id)
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn ids(pool: &PgPool, restaurant_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn count_active(pool: &PgPool, restaurant_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE restaurant_id = $1 AND is_active")
            .bind(restaurant_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: i64,
    data: &ProductCreate,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (id, restaurant_id, category_id, name, description, price, image_url, sort_order)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(restaurant_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.sort_order.unwrap_or(0))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &ProductUpdate,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET
            category_id = COALESCE($3, category_id),
            name = COALESCE($4, name),
            description = COALESCE($5, description),
            price = COALESCE($6, price),
            image_url = COALESCE($7, image_url),
            sort_order = COALESCE($8, sort_order),
            is_available = COALESCE($9, is_available),
            is_active = COALESCE($10, is_active)
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.sort_order)
    .bind(data.is_available)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}

/// Flip `is_available` (esgotado / disponível)
pub async fn toggle_available(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "UPDATE products SET is_available = NOT is_available
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE restaurant_id = $1 AND id = $2")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
