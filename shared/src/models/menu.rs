//! Public menu (cardápio digital)

use serde::{Deserialize, Serialize};

/// Presentational theme of the public menu
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "menu_theme", rename_all = "snake_case"))]
pub enum MenuTheme {
    #[default]
    Classico,
    Moderno,
    Minimalista,
}

impl MenuTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classico => "classico",
            Self::Moderno => "moderno",
            Self::Minimalista => "minimalista",
        }
    }

    /// Parse a theme name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classico" | "clássico" => Some(Self::Classico),
            "moderno" => Some(Self::Moderno),
            "minimalista" => Some(Self::Minimalista),
            _ => None,
        }
    }

    /// Requested theme, else the restaurant's own theme
    pub fn resolve(requested: Option<&str>, restaurant: Self) -> Self {
        requested.and_then(Self::from_name).unwrap_or(restaurant)
    }
}

/// Restaurant header of the public menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRestaurant {
    pub name: String,
    pub slug: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub is_open: bool,
    pub theme: MenuTheme,
}

/// Menu line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Price formatted as BRL
    pub price_label: String,
    pub image_url: Option<String>,
    pub available: bool,
}

/// Category block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMenuSection {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<PublicMenuItem>,
}

/// Public menu document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMenu {
    pub restaurant: PublicRestaurant,
    pub sections: Vec<PublicMenuSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_fallback() {
        assert_eq!(
            MenuTheme::resolve(Some("Moderno"), MenuTheme::Classico),
            MenuTheme::Moderno
        );
        assert_eq!(
            MenuTheme::resolve(Some("neon"), MenuTheme::Minimalista),
            MenuTheme::Minimalista
        );
        assert_eq!(MenuTheme::resolve(None, MenuTheme::default()), MenuTheme::Classico);
    }
}
