//! Employee permissions
//!
//! Each dashboard module carries a `can_view` / `can_edit` pair. Edit
//! access always implies view access.

use super::employee::EmployeeRole;
use serde::{Deserialize, Serialize};

/// Dashboard module guarded by a permission pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "permission_module", rename_all = "snake_case")
)]
pub enum PermissionModule {
    Dashboard,
    Pdv,
    Pedidos,
    Produtos,
    Mesas,
    Funcionarios,
    Configuracoes,
    Integracoes,
    Relatorios,
}

impl PermissionModule {
    pub const ALL: [PermissionModule; 9] = [
        PermissionModule::Dashboard,
        PermissionModule::Pdv,
        PermissionModule::Pedidos,
        PermissionModule::Produtos,
        PermissionModule::Mesas,
        PermissionModule::Funcionarios,
        PermissionModule::Configuracoes,
        PermissionModule::Integracoes,
        PermissionModule::Relatorios,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Pdv => "pdv",
            Self::Pedidos => "pedidos",
            Self::Produtos => "produtos",
            Self::Mesas => "mesas",
            Self::Funcionarios => "funcionarios",
            Self::Configuracoes => "configuracoes",
            Self::Integracoes => "integracoes",
            Self::Relatorios => "relatorios",
        }
    }
}

/// One module's flags for an employee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModulePermission {
    pub module: PermissionModule,
    pub can_view: bool,
    pub can_edit: bool,
}

impl ModulePermission {
    pub const fn none(module: PermissionModule) -> Self {
        Self {
            module,
            can_view: false,
            can_edit: false,
        }
    }

    pub const fn view(module: PermissionModule) -> Self {
        Self {
            module,
            can_view: true,
            can_edit: false,
        }
    }

    pub const fn edit(module: PermissionModule) -> Self {
        Self {
            module,
            can_view: true,
            can_edit: true,
        }
    }
}

/// Full permission set of an employee, one entry per module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<ModulePermission>);

impl PermissionSet {
    /// Build a set from arbitrary entries.
    ///
    /// Missing modules are filled with no access, duplicates keep the last
    /// entry, and `can_edit` forces `can_view`. Output is ordered by module.
    pub fn from_entries(entries: impl IntoIterator<Item = ModulePermission>) -> Self {
        let mut slots: Vec<ModulePermission> = PermissionModule::ALL
            .into_iter()
            .map(ModulePermission::none)
            .collect();
        for mut entry in entries {
            if entry.can_edit {
                entry.can_view = true;
            }
            if let Some(slot) = slots.iter_mut().find(|s| s.module == entry.module) {
                *slot = entry;
            }
        }
        Self(slots)
    }

    /// Default permissions for a role
    pub fn for_role(role: EmployeeRole) -> Self {
        use PermissionModule::*;
        let entries: Vec<ModulePermission> = match role {
            EmployeeRole::Admin => PermissionModule::ALL
                .into_iter()
                .map(ModulePermission::edit)
                .collect(),
            EmployeeRole::Gerente => PermissionModule::ALL
                .into_iter()
                .map(|m| match m {
                    Configuracoes | Integracoes => ModulePermission::view(m),
                    _ => ModulePermission::edit(m),
                })
                .collect(),
            EmployeeRole::Garcom => vec![
                ModulePermission::edit(Pdv),
                ModulePermission::edit(Pedidos),
                ModulePermission::edit(Mesas),
                ModulePermission::view(Produtos),
            ],
            EmployeeRole::Caixa => vec![
                ModulePermission::view(Dashboard),
                ModulePermission::edit(Pdv),
                ModulePermission::edit(Pedidos),
                ModulePermission::view(Mesas),
                ModulePermission::view(Produtos),
                ModulePermission::view(Relatorios),
            ],
            EmployeeRole::Cozinha => vec![
                ModulePermission::edit(Pedidos),
                ModulePermission::view(Produtos),
            ],
        };
        Self::from_entries(entries)
    }

    /// Flags for a module
    pub fn get(&self, module: PermissionModule) -> ModulePermission {
        self.0
            .iter()
            .copied()
            .find(|p| p.module == module)
            .unwrap_or(ModulePermission::none(module))
    }

    /// Whether the set grants view (or edit, when `edit` is true) access
    pub fn allows(&self, module: PermissionModule, edit: bool) -> bool {
        let p = self.get(module);
        if edit { p.can_edit } else { p.can_view }
    }

    pub fn entries(&self) -> &[ModulePermission] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_everything() {
        let set = PermissionSet::for_role(EmployeeRole::Admin);
        for m in PermissionModule::ALL {
            assert!(set.allows(m, true), "{m:?}");
        }
    }

    #[test]
    fn kitchen_only_sees_orders_and_products() {
        let set = PermissionSet::for_role(EmployeeRole::Cozinha);
        assert!(set.allows(PermissionModule::Pedidos, true));
        assert!(set.allows(PermissionModule::Produtos, false));
        assert!(!set.allows(PermissionModule::Produtos, true));
        assert!(!set.allows(PermissionModule::Pdv, false));
        assert!(!set.allows(PermissionModule::Configuracoes, false));
    }

    #[test]
    fn manager_cannot_edit_settings() {
        let set = PermissionSet::for_role(EmployeeRole::Gerente);
        assert!(set.allows(PermissionModule::Configuracoes, false));
        assert!(!set.allows(PermissionModule::Configuracoes, true));
        assert!(set.allows(PermissionModule::Funcionarios, true));
    }

    #[test]
    fn from_entries_fills_and_normalizes() {
        let set = PermissionSet::from_entries([
            ModulePermission {
                module: PermissionModule::Mesas,
                can_view: false,
                can_edit: true,
            },
            ModulePermission::view(PermissionModule::Pdv),
            ModulePermission::none(PermissionModule::Pdv),
        ]);
        assert_eq!(set.entries().len(), PermissionModule::ALL.len());
        assert!(set.allows(PermissionModule::Mesas, false));
        assert!(!set.allows(PermissionModule::Pdv, false));
        assert_eq!(set.entries()[0].module, PermissionModule::Dashboard);
    }

    #[test]
    fn serializes_as_plain_list() {
        let set = PermissionSet::for_role(EmployeeRole::Garcom);
        let json = serde_json::to_value(&set).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 9);
        assert_eq!(arr[1]["module"], "pdv");
        assert_eq!(arr[1]["can_edit"], true);
    }
}
