//! Database access layer
//!
//! One module per entity. Every tenant-owned query is scoped by
//! `restaurant_id`; rows of another restaurant are simply not found.

pub mod accounts;
pub mod areas;
pub mod categories;
pub mod dashboard;
pub mod employees;
pub mod ifood;
pub mod mesas;
pub mod orders;
pub mod permissions;
pub mod products;
pub mod restaurants;
pub mod subscriptions;
pub mod whatsapp;

/// Seed rows for database-backed tests
#[cfg(test)]
pub(crate) mod fixtures {
    use shared::models::{
        Area, AreaCreate, Category, CategoryCreate, Mesa, MesaCreate, Product, ProductCreate,
        Restaurant,
    };
    use shared::util::now_millis;
    use sqlx::PgPool;

    use crate::auth::{AccountRole, AuthIdentity};

    /// Restaurant with its owner account and trial subscription
    pub async fn restaurant(pool: &PgPool, slug: &str) -> (Restaurant, AuthIdentity) {
        let email = format!("{slug}@example.com");
        let owner = super::accounts::NewOwner {
            restaurant_name: "Cantina da Praça",
            slug,
            phone: None,
            email: &email,
            password_hash: "not-a-real-hash",
            now: now_millis(),
        };
        let (restaurant, account_id) = super::accounts::register_owner(pool, &owner)
            .await
            .unwrap();
        let identity = AuthIdentity {
            account_id,
            restaurant_id: restaurant.id,
            role: AccountRole::Owner,
            employee_id: None,
        };
        (restaurant, identity)
    }

    pub async fn category(pool: &PgPool, restaurant_id: i64, name: &str) -> Category {
        let data = CategoryCreate {
            name: name.into(),
            description: None,
            sort_order: None,
        };
        super::categories::create(pool, restaurant_id, &data)
            .await
            .unwrap()
    }

    pub async fn product(pool: &PgPool, restaurant_id: i64, category_id: i64, price: f64) -> Product {
        let data = ProductCreate {
            category_id,
            name: "X-Burguer".into(),
            description: None,
            price,
            image_url: None,
            sort_order: None,
        };
        super::products::create(pool, restaurant_id, &data)
            .await
            .unwrap()
    }

    pub async fn area(pool: &PgPool, restaurant_id: i64, name: &str) -> Area {
        let data = AreaCreate {
            name: name.into(),
            description: None,
            sort_order: None,
        };
        super::areas::create(pool, restaurant_id, &data).await.unwrap()
    }

    pub async fn mesa(pool: &PgPool, restaurant_id: i64, area_id: Option<i64>, number: i32) -> Mesa {
        let data = MesaCreate {
            area_id,
            number,
            name: None,
            capacity: 4,
        };
        super::mesas::create(pool, restaurant_id, &data).await.unwrap()
    }
}
