//! Employees and their permissions (`funcionarios` module)

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Employee, EmployeeCreate, EmployeeUpdate, ModulePermission, PermissionModule, PermissionSet,
    validate_name,
};

use super::ApiResult;
use super::auth::normalize_email;
use crate::auth::password::{hash_password, validate_password};
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::error::{internal, is_unique_violation};
use crate::services::billing;
use crate::state::AppState;

async fn require_staff(state: &AppState, identity: &AuthIdentity, edit: bool) -> Result<(), AppError> {
    require_permission(state, identity, PermissionModule::Funcionarios, edit).await
}

async fn load_employee(state: &AppState, rid: i64, id: i64) -> Result<Employee, AppError> {
    db::employees::find(&state.pool, rid, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))
}

/// Empty strings count as "no email"
fn normalize_optional_email(email: Option<String>) -> Result<Option<String>, AppError> {
    email
        .filter(|e| !e.trim().is_empty())
        .map(|e| normalize_email(&e))
        .transpose()
}

fn map_email_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::new(ErrorCode::EmployeeEmailExists)
    } else {
        internal(e)
    }
}

pub async fn list_employees(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Vec<Employee>> {
    require_staff(&state, &identity, false).await?;
    let employees = db::employees::list(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(employees))
}

/// Create an employee. With `password` (and `email`) a login account is
/// created too.
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(mut data): Json<EmployeeCreate>,
) -> ApiResult<Employee> {
    require_staff(&state, &identity, true).await?;
    let rid = identity.restaurant_id;
    validate_name(&data.name, "name")?;
    data.email = normalize_optional_email(data.email.take())?;

    let password_hash = match data.password.as_deref() {
        Some(password) => {
            let Some(email) = data.email.as_deref() else {
                return Err(AppError::with_message(
                    ErrorCode::RequiredField,
                    "email is required to create a login",
                )
                .with_detail("field", "email"));
            };
            validate_password(password)?;
            if db::accounts::email_exists(&state.pool, email)
                .await
                .map_err(internal)?
            {
                return Err(AppError::new(ErrorCode::EmployeeEmailExists));
            }
            Some(hash_password(password).map_err(|e| {
                tracing::error!("Password hashing failed: {e}");
                AppError::new(ErrorCode::InternalError)
            })?)
        }
        None => None,
    };

    billing::ensure_employee_capacity(&state, rid).await?;

    let employee = db::employees::create(
        &state.pool,
        rid,
        &data,
        password_hash.as_deref(),
        shared::util::now_millis(),
    )
    .await
    .map_err(map_email_conflict)?;

    tracing::info!(
        restaurant_id = rid,
        employee_id = employee.id,
        role = ?employee.role,
        with_login = employee.account_id.is_some(),
        "Employee created"
    );
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(mut data): Json<EmployeeUpdate>,
) -> ApiResult<Employee> {
    require_staff(&state, &identity, true).await?;
    if let Some(name) = &data.name {
        validate_name(name, "name")?;
    }
    data.email = normalize_optional_email(data.email.take())?;
    if data.is_active == Some(false) && identity.employee_id == Some(id) {
        return Err(AppError::new(ErrorCode::EmployeeCannotDeleteSelf));
    }

    let employee = db::employees::update(&state.pool, identity.restaurant_id, id, &data)
        .await
        .map_err(map_email_conflict)?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    Ok(Json(employee))
}

async fn set_active(
    state: &AppState,
    identity: &AuthIdentity,
    id: i64,
    active: bool,
) -> Result<Employee, AppError> {
    require_staff(state, identity, true).await?;
    let rid = identity.restaurant_id;
    if !active && identity.employee_id == Some(id) {
        return Err(AppError::new(ErrorCode::EmployeeCannotDeleteSelf));
    }
    let current = load_employee(state, rid, id).await?;
    if active && !current.is_active {
        billing::ensure_employee_capacity(state, rid).await?;
    }

    let employee = db::employees::set_active(&state.pool, rid, id, active)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    tracing::info!(restaurant_id = rid, employee_id = id, active, "Employee status changed");
    Ok(employee)
}

pub async fn enable_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Employee> {
    Ok(Json(set_active(&state, &identity, id, true).await?))
}

pub async fn disable_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Employee> {
    Ok(Json(set_active(&state, &identity, id, false).await?))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    require_staff(&state, &identity, true).await?;
    if identity.employee_id == Some(id) {
        return Err(AppError::new(ErrorCode::EmployeeCannotDeleteSelf));
    }
    if !db::employees::delete(&state.pool, identity.restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::EmployeeNotFound));
    }
    tracing::info!(restaurant_id = identity.restaurant_id, employee_id = id, "Employee deleted");
    Ok(Json(true))
}

// ── Permissions ──

pub async fn get_permissions(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<PermissionSet> {
    require_staff(&state, &identity, false).await?;
    load_employee(&state, identity.restaurant_id, id).await?;
    let set = db::permissions::load_set(&state.pool, id)
        .await
        .map_err(internal)?;
    Ok(Json(set))
}

/// Replace the whole set; modules left out lose access
pub async fn replace_permissions(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(entries): Json<Vec<ModulePermission>>,
) -> ApiResult<PermissionSet> {
    require_staff(&state, &identity, true).await?;
    load_employee(&state, identity.restaurant_id, id).await?;

    let set = PermissionSet::from_entries(entries);
    db::permissions::replace(&state.pool, id, &set)
        .await
        .map_err(internal)?;
    tracing::info!(restaurant_id = identity.restaurant_id, employee_id = id, "Permissions replaced");
    Ok(Json(set))
}

/// Back to the defaults of the employee's role
pub async fn reset_permissions(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<PermissionSet> {
    require_staff(&state, &identity, true).await?;
    let employee = load_employee(&state, identity.restaurant_id, id).await?;

    let set = PermissionSet::for_role(employee.role);
    db::permissions::replace(&state.pool, id, &set)
        .await
        .map_err(internal)?;
    Ok(Json(set))
}
