//! Login accounts (owners and employees)

use shared::models::{Plan, Restaurant, SubscriptionStatus, TRIAL_DAYS};
use shared::util::snowflake_id;
use sqlx::{PgConnection, PgPool};

use super::restaurants;

#[derive(Debug, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub restaurant_id: i64,
    pub password_hash: String,
    pub is_owner: bool,
    pub employee_id: Option<i64>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AccountRow>, sqlx::Error> {
    sqlx::query_as::<_, AccountRow>(
        "SELECT id, restaurant_id, password_hash, is_owner, employee_id
         FROM accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub struct NewOwner<'a> {
    pub restaurant_name: &'a str,
    pub slug: &'a str,
    pub phone: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub now: i64,
}

/// Create restaurant, owner account and trial subscription in one transaction.
///
/// Returns the restaurant and the owner's account id.
pub async fn register_owner(
    pool: &PgPool,
    owner: &NewOwner<'_>,
) -> Result<(Restaurant, i64), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "INSERT INTO restaurants (id, name, slug, phone, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        restaurants::COLUMNS
    ))
    .bind(snowflake_id())
    .bind(owner.restaurant_name)
    .bind(owner.slug)
    .bind(owner.phone)
    .bind(owner.now)
    .fetch_one(&mut *tx)
    .await?;

    let account_id = snowflake_id();
    sqlx::query(
        "INSERT INTO accounts (id, restaurant_id, email, password_hash, is_owner, created_at)
         VALUES ($1, $2, $3, $4, TRUE, $5)",
    )
    .bind(account_id)
    .bind(restaurant.id)
    .bind(owner.email)
    .bind(owner.password_hash)
    .bind(owner.now)
    .execute(&mut *tx)
    .await?;

    let trial_end = owner.now + TRIAL_DAYS * 24 * 60 * 60 * 1000;
    sqlx::query(
        "INSERT INTO subscriptions (id, restaurant_id, plan, status, current_period_end, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)",
    )
    .bind(snowflake_id())
    .bind(restaurant.id)
    .bind(Plan::Basico)
    .bind(SubscriptionStatus::Trialing)
    .bind(trial_end)
    .bind(owner.now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((restaurant, account_id))
}

/// Login account for an employee (inside the employee's transaction)
pub async fn create_for_employee(
    conn: &mut PgConnection,
    restaurant_id: i64,
    employee_id: i64,
    email: &str,
    password_hash: &str,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO accounts (id, restaurant_id, email, password_hash, is_owner, employee_id, created_at)
         VALUES ($1, $2, $3, $4, FALSE, $5, $6)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(email)
    .bind(password_hash)
    .bind(employee_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::util::now_millis;

    #[sqlx::test(migrations = "./migrations")]
    async fn owner_registration_is_found_by_email(pool: PgPool) {
        let owner = NewOwner {
            restaurant_name: "Empório",
            slug: "emporio",
            phone: None,
            email: "dono@emporio.com",
            password_hash: "hash",
            now: now_millis(),
        };
        let (restaurant, account_id) = register_owner(&pool, &owner).await.unwrap();

        let row = find_by_email(&pool, "dono@emporio.com").await.unwrap().unwrap();
        assert_eq!(row.id, account_id);
        assert_eq!(row.restaurant_id, restaurant.id);
        assert!(row.is_owner);
        assert_eq!(row.employee_id, None);
        assert!(email_exists(&pool, "dono@emporio.com").await.unwrap());
        assert!(find_by_email(&pool, "outro@emporio.com").await.unwrap().is_none());
    }
}
