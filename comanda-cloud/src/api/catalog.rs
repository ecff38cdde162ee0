//! Categories and products
//!
//! Reads are open to every session of the restaurant (the PDV needs the
//! catalog); writes need `produtos` edit access. Each write publishes a
//! change event.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, PermissionModule, Product, ProductCreate,
    ProductUpdate, validate_name, validate_price,
};
use shared::realtime::{ChangeAction, ChangeEvent};

use super::ApiResult;
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::error::{internal, is_foreign_key_violation, is_unique_violation};
use crate::services::billing;
use crate::state::AppState;

async fn require_catalog_edit(state: &AppState, identity: &AuthIdentity) -> Result<(), AppError> {
    require_permission(state, identity, PermissionModule::Produtos, true).await
}

fn publish<T: serde::Serialize>(state: &AppState, table: &str, action: ChangeAction, rid: i64, row: &T) {
    state
        .realtime
        .publish(ChangeEvent::for_row(table, action, rid, row));
}

// ── Categories ──

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Vec<Category>> {
    let categories = db::categories::list(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(categories))
}

fn category_name_taken(name: &str) -> AppError {
    AppError::new(ErrorCode::CategoryNameExists).with_detail("name", name.trim())
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<CategoryCreate>,
) -> ApiResult<Category> {
    require_catalog_edit(&state, &identity).await?;
    validate_name(&data.name, "name")?;

    let category = db::categories::create(&state.pool, identity.restaurant_id, &data)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                category_name_taken(&data.name)
            } else {
                internal(e)
            }
        })?;

    publish(&state, "categories", ChangeAction::Insert, identity.restaurant_id, &category);
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    require_catalog_edit(&state, &identity).await?;
    if let Some(name) = &data.name {
        validate_name(name, "name")?;
    }

    let category = db::categories::update(&state.pool, identity.restaurant_id, id, &data)
        .await
        .map_err(|e| match &data.name {
            Some(name) if is_unique_violation(&e) => category_name_taken(name),
            _ => internal(e),
        })?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;

    publish(&state, "categories", ChangeAction::Update, identity.restaurant_id, &category);
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    require_catalog_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;

    if db::categories::has_products(&state.pool, rid, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::CategoryHasProducts));
    }
    let deleted = db::categories::delete(&state.pool, rid, id)
        .await
        .map_err(|e| {
            // a product was added in between
            if is_foreign_key_violation(&e) {
                AppError::new(ErrorCode::CategoryHasProducts)
            } else {
                internal(e)
            }
        })?;
    if !deleted {
        return Err(AppError::new(ErrorCode::CategoryNotFound));
    }

    state
        .realtime
        .publish(ChangeEvent::deleted("categories", rid, id));
    Ok(Json(true))
}

// ── Products ──

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<i64>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let products = db::products::list(&state.pool, identity.restaurant_id, query.category_id)
        .await
        .map_err(internal)?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    let product = db::products::find(&state.pool, identity.restaurant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(Json(product))
}

async fn ensure_category(state: &AppState, rid: i64, category_id: i64) -> Result<(), AppError> {
    if !db::categories::exists(&state.pool, rid, category_id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", category_id));
    }
    Ok(())
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<ProductCreate>,
) -> ApiResult<Product> {
    require_catalog_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    validate_name(&data.name, "name")?;
    validate_price(data.price)?;
    ensure_category(&state, rid, data.category_id).await?;
    billing::ensure_product_capacity(&state, rid).await?;

    let product = db::products::create(&state.pool, rid, &data)
        .await
        .map_err(internal)?;

    tracing::info!(restaurant_id = rid, product_id = product.id, "Product created");
    publish(&state, "products", ChangeAction::Insert, rid, &product);
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<ProductUpdate>,
) -> ApiResult<Product> {
    require_catalog_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    if let Some(name) = &data.name {
        validate_name(name, "name")?;
    }
    if let Some(price) = data.price {
        validate_price(price)?;
    }
    if let Some(category_id) = data.category_id {
        ensure_category(&state, rid, category_id).await?;
    }
    // re-activating counts against the plan
    if data.is_active == Some(true) {
        let current = db::products::find(&state.pool, rid, id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
        if !current.is_active {
            billing::ensure_product_capacity(&state, rid).await?;
        }
    }

    let product = db::products::update(&state.pool, rid, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    publish(&state, "products", ChangeAction::Update, rid, &product);
    Ok(Json(product))
}

/// POST /api/products/{id}/toggle-availability ("esgotado")
pub async fn toggle_availability(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    require_catalog_edit(&state, &identity).await?;
    let product = db::products::toggle_available(&state.pool, identity.restaurant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    publish(&state, "products", ChangeAction::Update, identity.restaurant_id, &product);
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    require_catalog_edit(&state, &identity).await?;
    if !db::products::delete(&state.pool, identity.restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }

    state
        .realtime
        .publish(ChangeEvent::deleted("products", identity.restaurant_id, id));
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    async fn created_product_is_listed(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, owner) = fixtures::restaurant(&pool, "sabor").await;
        let category = fixtures::category(&pool, restaurant.id, "Sobremesas").await;
        let mut feed = state.realtime.subscribe(restaurant.id);

        let Json(created) = create_product(
            State(state.clone()),
            Extension(owner),
            Json(ProductCreate {
                category_id: category.id,
                name: " Pudim ".into(),
                description: Some("de leite".into()),
                price: 9.9,
                image_url: None,
                sort_order: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(created.name, "Pudim");
        assert_eq!(created.price, 9.9);
        assert_eq!(feed.try_recv().unwrap().table, "products");

        let Json(listed) = list_products(
            State(state),
            Extension(owner),
            Query(ProductQuery {
                category_id: Some(category.id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].category_id, category.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn negative_price_is_rejected(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, owner) = fixtures::restaurant(&pool, "caro").await;
        let category = fixtures::category(&pool, restaurant.id, "Pratos").await;

        let err = create_product(
            State(state),
            Extension(owner),
            Json(ProductCreate {
                category_id: category.id,
                name: "Feijoada".into(),
                description: None,
                price: -1.0,
                image_url: None,
                sort_order: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
        assert!(db::products::list(&pool, restaurant.id, None).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn category_with_products_cannot_be_deleted(pool: PgPool) {
        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, owner) = fixtures::restaurant(&pool, "lanchonete").await;
        let rid = restaurant.id;
        let category = fixtures::category(&pool, rid, "Lanches").await;
        let product = fixtures::product(&pool, rid, category.id, 18.0).await;

        let err = delete_category(State(state.clone()), Extension(owner), Path(category.id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryHasProducts);
        assert!(db::categories::exists(&pool, rid, category.id).await.unwrap());

        db::products::delete(&pool, rid, product.id).await.unwrap();
        let Json(deleted) = delete_category(State(state), Extension(owner), Path(category.id))
            .await
            .unwrap();
        assert!(deleted);
    }
}
