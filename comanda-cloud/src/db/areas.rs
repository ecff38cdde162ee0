use shared::models::{Area, AreaCreate, AreaUpdate};
use shared::util::snowflake_id;
use sqlx::PgPool;

const COLUMNS: &str = "id, name, description, sort_order";

pub async fn list(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Area>, sqlx::Error> {
    sqlx::query_as::<_, Area>(&format!(
        "SELECT {COLUMNS} FROM areas WHERE restaurant_id = $1 ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn exists(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM areas WHERE restaurant_id = $1 AND id = $2")
            .bind(restaurant_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: i64,
    data: &AreaCreate,
) -> Result<Area, sqlx::Error> {
    sqlx::query_as::<_, Area>(&format!(
        "INSERT INTO areas (id, restaurant_id, name, description, sort_order)
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
    data: &AreaUpdate,
) -> Result<Option<Area>, sqlx::Error> {
    sqlx::query_as::<_, Area>(&format!(
        "UPDATE areas SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            sort_order = COALESCE($5, sort_order)
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.sort_order)
    .fetch_optional(pool)
    .await
}

pub async fn has_mesas(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM mesas WHERE restaurant_id = $1 AND area_id = $2")
            .bind(restaurant_id)
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM areas WHERE restaurant_id = $1 AND id = $2")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
