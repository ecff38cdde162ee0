//! Permission checks for employee accounts
//!
//! Owners pass every check. Employees need the module flag from their
//! stored permission set and must still be active.

use shared::error::{AppError, ErrorCode};
use shared::models::{PermissionModule, PermissionSet};

use super::AuthIdentity;
use crate::db;
use crate::state::AppState;

/// Decide access from an already-loaded permission set
pub fn check(
    identity: &AuthIdentity,
    set: Option<&PermissionSet>,
    module: PermissionModule,
    edit: bool,
) -> Result<(), AppError> {
    if identity.is_owner() {
        return Ok(());
    }
    if set.is_some_and(|s| s.allows(module, edit)) {
        return Ok(());
    }
    let action = if edit { "edit" } else { "view" };
    Err(
        AppError::permission_denied(format!("{}:{action}", module.as_str()))
            .with_detail("module", module.as_str())
            .with_detail("action", action),
    )
}

/// Require view (or edit) access to a module
pub async fn require_permission(
    state: &AppState,
    identity: &AuthIdentity,
    module: PermissionModule,
    edit: bool,
) -> Result<(), AppError> {
    if identity.is_owner() {
        return Ok(());
    }
    let Some(employee_id) = identity.employee_id else {
        return Err(AppError::permission_denied("no employee bound to account"));
    };

    let employee = db::employees::find(&state.pool, identity.restaurant_id, employee_id)
        .await
        .map_err(crate::error::internal)?
        .ok_or_else(|| AppError::new(ErrorCode::AccountDisabled))?;
    if !employee.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let set = db::permissions::load_set(&state.pool, employee_id)
        .await
        .map_err(crate::error::internal)?;
    check(identity, Some(&set), module, edit)
}

/// Billing and account-level settings are owner-only
pub fn require_owner(identity: &AuthIdentity) -> Result<(), AppError> {
    if identity.is_owner() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::OwnerRequired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccountRole;
    use shared::models::EmployeeRole;

    fn identity(role: AccountRole) -> AuthIdentity {
        AuthIdentity {
            account_id: 1,
            restaurant_id: 1,
            role,
            employee_id: (role == AccountRole::Employee).then_some(5),
        }
    }

    #[test]
    fn owner_always_passes() {
        let owner = identity(AccountRole::Owner);
        assert!(check(&owner, None, PermissionModule::Configuracoes, true).is_ok());
        assert!(require_owner(&owner).is_ok());
    }

    #[test]
    fn employee_needs_flag() {
        let waiter = identity(AccountRole::Employee);
        let set = PermissionSet::for_role(EmployeeRole::Garcom);

        assert!(check(&waiter, Some(&set), PermissionModule::Pdv, true).is_ok());
        assert!(check(&waiter, Some(&set), PermissionModule::Produtos, false).is_ok());

        let err = check(&waiter, Some(&set), PermissionModule::Produtos, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.message, "produtos:edit");

        assert!(check(&waiter, None, PermissionModule::Pdv, false).is_err());
        assert_eq!(
            require_owner(&waiter).unwrap_err().code,
            ErrorCode::OwnerRequired
        );
    }
}
