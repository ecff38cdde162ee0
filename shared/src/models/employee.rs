//! Employee Model (funcionários)

use serde::{Deserialize, Serialize};

/// Employee role; drives the default permission set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "employee_role", rename_all = "snake_case")
)]
pub enum EmployeeRole {
    Admin,
    Gerente,
    Garcom,
    Caixa,
    Cozinha,
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: EmployeeRole,
    pub is_active: bool,
    /// Login account, present when the employee can sign in
    pub account_id: Option<i64>,
    pub created_at: i64,
}

/// Create employee payload
///
/// When `password` is given together with `email`, a login account is
/// created for the employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: EmployeeRole,
    pub password: Option<String>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<EmployeeRole>,
    pub is_active: Option<bool>,
}
