use shared::models::{Mesa, MesaCreate, MesaStatus, MesaUpdate};
use shared::util::snowflake_id;
use sqlx::{PgConnection, PgPool};

const COLUMNS: &str = "id, area_id, number, name, capacity, status, is_active";

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    area_id: Option<i64>,
) -> Result<Vec<Mesa>, sqlx::Error> {
    sqlx::query_as::<_, Mesa>(&format!(
        "SELECT {COLUMNS} FROM mesas
         WHERE restaurant_id = $1 AND ($2::BIGINT IS NULL OR area_id = $2)
         ORDER BY number"
    ))
    .bind(restaurant_id)
    .bind(area_id)
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Mesa>, sqlx::Error> {
    sqlx::query_as::<_, Mesa>(&format!(
        "SELECT {COLUMNS} FROM mesas WHERE restaurant_id = $1 AND id = $2"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: i64,
    data: &MesaCreate,
) -> Result<Mesa, sqlx::Error> {
    sqlx::query_as::<_, Mesa>(&format!(
        "INSERT INTO mesas (id, restaurant_id, area_id, number, name, capacity)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(restaurant_id)
    .bind(data.area_id)
    .bind(data.number)
    .bind(&data.name)
    .bind(data.capacity)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &MesaUpdate,
) -> Result<Option<Mesa>, sqlx::Error> {
    sqlx::query_as::<_, Mesa>(&format!(
        "UPDATE mesas SET
            area_id = COALESCE($3, area_id),
            number = COALESCE($4, number),
            name = COALESCE($5, name),
            capacity = COALESCE($6, capacity),
            is_active = COALESCE($7, is_active)
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(data.area_id)
    .bind(data.number)
    .bind(&data.name)
    .bind(data.capacity)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}

pub async fn set_status(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
    status: MesaStatus,
) -> Result<Option<Mesa>, sqlx::Error> {
    sqlx::query_as::<_, Mesa>(&format!(
        "UPDATE mesas SET status = $3
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await
}

pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM mesas WHERE restaurant_id = $1 AND id = $2")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
