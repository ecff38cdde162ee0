//! Employees (funcionários)

use shared::models::{Employee, EmployeeCreate, EmployeeUpdate, PermissionSet};
use shared::util::snowflake_id;
use sqlx::PgPool;

use super::{accounts, permissions};

const COLUMNS: &str = "id, name, email, phone, role, is_active, account_id, created_at";

pub async fn list(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE restaurant_id = $1 ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE restaurant_id = $1 AND id = $2"
    ))
    .bind(restaurant_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn count_active(pool: &PgPool, restaurant_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM employees WHERE restaurant_id = $1 AND is_active")
            .bind(restaurant_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Create the employee with its role's default permissions and, when a
/// password hash is given, a login account.
pub async fn create(
    pool: &PgPool,
    restaurant_id: i64,
    data: &EmployeeCreate,
    password_hash: Option<&str>,
    now: i64,
) -> Result<Employee, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let id = snowflake_id();

    sqlx::query(
        "INSERT INTO employees (id, restaurant_id, name, email, phone, role, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.role)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    permissions::replace_in(&mut *tx, id, &PermissionSet::for_role(data.role)).await?;

    if let (Some(email), Some(hash)) = (data.email.as_deref(), password_hash) {
        let account_id =
            accounts::create_for_employee(&mut *tx, restaurant_id, id, email, hash, now).await?;
        sqlx::query("UPDATE employees SET account_id = $2 WHERE id = $1")
            .bind(id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;
    }

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE id = $1"
    ))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(employee)
}

/// Update fields; a changed email also moves the login account
pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &EmployeeUpdate,
) -> Result<Option<Employee>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let employee = sqlx::query_as::<_, Employee>(&format!(
        "UPDATE employees SET
            name = COALESCE($3, name),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            role = COALESCE($6, role),
            is_active = COALESCE($7, is_active)
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.role)
    .bind(data.is_active)
    .fetch_optional(&mut *tx)
    .await?;

    if employee.is_some()
        && let Some(email) = data.email.as_deref()
    {
        sqlx::query("UPDATE accounts SET email = $2 WHERE employee_id = $1")
            .bind(id)
            .bind(email)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(employee)
}

/// Soft-disable or re-enable
pub async fn set_active(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    active: bool,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "UPDATE employees SET is_active = $3
         WHERE restaurant_id = $1 AND id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(id)
    .bind(active)
    .fetch_optional(pool)
    .await
}

/// Delete the employee; its account and permissions cascade
pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees WHERE restaurant_id = $1 AND id = $2")
        .bind(restaurant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
