use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::snowflake_id;
use sqlx::PgPool;

const COLUMNS: &str = "id, name, description, sort_order, is_active";

pub async fn list(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE restaurant_id = $1 ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn list_active(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories
         WHERE restaurant_id = $1 AND is_active
         ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn exists(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM categories WHERE restaurant_id = $1 AND id = $2")
            .bind(restaurant_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: i64,
    data: &CategoryCreate,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (id, restaurant_id, name, description, sort_order)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.sort_order.unwrap_or(0))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &CategoryUpdate,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            sort_order = COALESCE($5, sort_order),
            is_active = COALESCE($6, is_active)
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.sort_order)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}

pub async fn has_products(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE restaurant_id = $1 AND category_id = $2",
    )
    .bind(restaurant_id)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Returns `false` when no such category exists
pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE restaurant_id = $1 AND id = $2")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
