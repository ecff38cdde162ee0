use shared::models::{ModulePermission, PermissionSet};
use sqlx::{PgConnection, PgPool};

/// Stored permissions of an employee; missing modules mean no access
pub async fn load_set(pool: &PgPool, employee_id: i64) -> Result<PermissionSet, sqlx::Error> {
    let rows = sqlx::query_as::<_, ModulePermission>(
        "SELECT module, can_view, can_edit FROM employee_permissions WHERE employee_id = $1",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(PermissionSet::from_entries(rows))
}

pub async fn replace(
    pool: &PgPool,
    employee_id: i64,
    set: &PermissionSet,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    replace_in(&mut *tx, employee_id, set).await?;
    tx.commit().await
}

/// Replace inside an open transaction
pub async fn replace_in(
    conn: &mut PgConnection,
    employee_id: i64,
    set: &PermissionSet,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM employee_permissions WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;

    for entry in set.entries() {
        sqlx::query(
            "INSERT INTO employee_permissions (employee_id, module, can_view, can_edit)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(employee_id)
        .bind(entry.module)
        .bind(entry.can_view)
        .bind(entry.can_edit)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
