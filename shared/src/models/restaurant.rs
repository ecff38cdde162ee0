//! Restaurant Model (the tenant)

use serde::{Deserialize, Serialize};

use super::menu::MenuTheme;

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// Public menu path segment (`/cardapio/{slug}`)
    pub slug: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub menu_theme: MenuTheme,
    pub is_open: bool,
    /// Default service fee applied by the PDV (e.g. 10 = 10%)
    pub service_fee_percent: f64,
    pub created_at: i64,
}

/// Update restaurant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub menu_theme: Option<MenuTheme>,
    pub is_open: Option<bool>,
    pub service_fee_percent: Option<f64>,
}
