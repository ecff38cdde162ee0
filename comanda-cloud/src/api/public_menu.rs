//! Public menu, no authentication
//!
//! `GET /api/public/menu/{slug}` returns the structured menu,
//! `GET /cardapio/{slug}?theme=` the rendered page.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuTheme, PublicMenu};

use crate::db;
use crate::error::internal;
use crate::menu::build_menu;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThemeQuery {
    pub theme: Option<String>,
}

async fn load_menu(state: &AppState, slug: &str) -> Result<PublicMenu, AppError> {
    let restaurant = db::restaurants::find_by_slug(&state.pool, slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    let (categories, products) = tokio::try_join!(
        db::categories::list_active(&state.pool, restaurant.id),
        db::products::list_active(&state.pool, restaurant.id),
    )
    .map_err(internal)?;
    Ok(build_menu(&restaurant, &categories, &products))
}

pub async fn menu_json(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicMenu>, AppError> {
    Ok(Json(load_menu(&state, &slug).await?))
}

pub async fn menu_html(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ThemeQuery>,
) -> Result<Html<String>, AppError> {
    let menu = load_menu(&state, &slug).await?;
    let theme = MenuTheme::resolve(query.theme.as_deref(), menu.restaurant.theme);
    let page = state.menu.render(&menu, theme)?;
    Ok(Html(page))
}
