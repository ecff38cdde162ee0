//! Public menu (cardápio digital)
//!
//! [`build_menu`] shapes restaurant + catalog rows into a [`PublicMenu`];
//! [`MenuRenderer`] turns it into HTML with one of three tera themes.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, MenuTheme, Product, PublicMenu, PublicMenuItem, PublicMenuSection, PublicRestaurant,
    Restaurant,
};
use shared::util::format_brl;
use std::sync::Arc;
use tera::Tera;

const TEMPLATES: [(&str, &str); 4] = [
    ("menu/base.html", include_str!("../../templates/menu/base.html")),
    ("menu/classico.html", include_str!("../../templates/menu/classico.html")),
    ("menu/moderno.html", include_str!("../../templates/menu/moderno.html")),
    ("menu/minimalista.html", include_str!("../../templates/menu/minimalista.html")),
];

/// Assemble the public menu.
///
/// Only active categories and active products are listed; sections
/// without products are dropped. Input order (sort_order) is kept.
pub fn build_menu(
    restaurant: &Restaurant,
    categories: &[Category],
    products: &[Product],
) -> PublicMenu {
    let sections = categories
        .iter()
        .filter(|c| c.is_active)
        .map(|c| PublicMenuSection {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone(),
            items: products
                .iter()
                .filter(|p| p.is_active && p.category_id == c.id)
                .map(|p| PublicMenuItem {
                    id: p.id,
                    name: p.name.clone(),
                    description: p.description.clone(),
                    price: p.price,
                    price_label: format_brl(p.price),
                    image_url: p.image_url.clone(),
                    available: p.is_available,
                })
                .collect(),
        })
        .filter(|s: &PublicMenuSection| !s.items.is_empty())
        .collect();

    PublicMenu {
        restaurant: PublicRestaurant {
            name: restaurant.name.clone(),
            slug: restaurant.slug.clone(),
            phone: restaurant.phone.clone(),
            address: restaurant.address.clone(),
            logo_url: restaurant.logo_url.clone(),
            is_open: restaurant.is_open,
            theme: restaurant.menu_theme,
        },
        sections,
    }
}

#[derive(Clone)]
pub struct MenuRenderer {
    tera: Arc<Tera>,
}

impl MenuRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Render the menu with a theme
    pub fn render(&self, menu: &PublicMenu, theme: MenuTheme) -> Result<String, AppError> {
        let mut ctx = tera::Context::new();
        ctx.insert("restaurant", &PublicRestaurant {
            theme,
            ..menu.restaurant.clone()
        });
        ctx.insert("sections", &menu.sections);

        self.tera
            .render(&format!("menu/{}.html", theme.as_str()), &ctx)
            .map_err(|e| {
                tracing::error!(theme = theme.as_str(), error = ?e, "Menu render failed");
                AppError::new(ErrorCode::TemplateError)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant() -> Restaurant {
        Restaurant {
            id: 1,
            name: "Cantina <Bella>".into(),
            slug: "cantina-bella".into(),
            phone: Some("(11) 3333-4444".into()),
            address: None,
            logo_url: None,
            menu_theme: MenuTheme::Moderno,
            is_open: true,
            service_fee_percent: 10.0,
            created_at: 0,
        }
    }

    fn category(id: i64, name: &str, active: bool) -> Category {
        Category {
            id,
            name: name.into(),
            description: None,
            sort_order: 0,
            is_active: active,
        }
    }

    fn product(id: i64, category_id: i64, price: f64, available: bool, active: bool) -> Product {
        Product {
            id,
            category_id,
            name: format!("Prato {id}"),
            description: None,
            price,
            image_url: None,
            sort_order: 0,
            is_available: available,
            is_active: active,
        }
    }

    fn menu() -> PublicMenu {
        build_menu(
            &restaurant(),
            &[
                category(1, "Massas", true),
                category(2, "Antigas", false),
                category(3, "Vazia", true),
            ],
            &[
                product(10, 1, 1234.5, true, true),
                product(11, 1, 30.0, false, true),
                product(12, 1, 30.0, true, false),
                product(20, 2, 10.0, true, true),
            ],
        )
    }

    #[test]
    fn only_active_rows_are_listed() {
        let menu = menu();
        assert_eq!(menu.sections.len(), 1);
        let items = &menu.sections[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price_label, "R$ 1.234,50");
        // esgotado stays visible
        assert!(!items[1].available);
        assert_eq!(menu.restaurant.theme, MenuTheme::Moderno);
    }

    #[test]
    fn every_theme_renders() {
        let renderer = MenuRenderer::new().unwrap();
        let menu = menu();
        for theme in [MenuTheme::Classico, MenuTheme::Moderno, MenuTheme::Minimalista] {
            let html = renderer.render(&menu, theme).unwrap();
            assert!(html.contains(&format!("tema-{}", theme.as_str())));
            assert!(html.contains("R$ 1.234,50"));
            assert!(html.contains("Massas"));
            assert!(!html.contains("Antigas"));
        }
    }

    #[test]
    fn names_are_escaped() {
        let renderer = MenuRenderer::new().unwrap();
        let html = renderer.render(&menu(), MenuTheme::Classico).unwrap();
        assert!(html.contains("Cantina &lt;Bella&gt;"));
        assert!(!html.contains("<Bella>"));
    }
}
