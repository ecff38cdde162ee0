//! The signed-in restaurant

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{PermissionModule, Restaurant, RestaurantUpdate, validate_name};

use super::ApiResult;
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::error::internal;
use crate::state::AppState;

/// Restaurant plus the public link of its menu
#[derive(Debug, Serialize)]
pub struct RestaurantView {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub menu_url: String,
}

pub fn menu_url(base_url: &str, slug: &str) -> String {
    format!("{}/cardapio/{slug}", base_url.trim_end_matches('/'))
}

fn view(state: &AppState, restaurant: Restaurant) -> RestaurantView {
    RestaurantView {
        menu_url: menu_url(&state.config.public_base_url, &restaurant.slug),
        restaurant,
    }
}

/// GET /api/restaurant
pub async fn get_restaurant(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<RestaurantView> {
    let restaurant = db::restaurants::find(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(Json(view(&state, restaurant)))
}

fn validate_update(data: &RestaurantUpdate) -> Result<(), AppError> {
    if let Some(name) = &data.name {
        validate_name(name, "name")?;
    }
    if let Some(fee) = data.service_fee_percent
        && (!fee.is_finite() || !(0.0..=100.0).contains(&fee))
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "service fee must be between 0 and 100",
        )
        .with_detail("field", "service_fee_percent"));
    }
    Ok(())
}

/// PUT /api/restaurant
pub async fn update_restaurant(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<RestaurantUpdate>,
) -> ApiResult<RestaurantView> {
    require_permission(&state, &identity, PermissionModule::Configuracoes, true).await?;
    validate_update(&data)?;

    let restaurant = db::restaurants::update(&state.pool, identity.restaurant_id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;

    tracing::info!(restaurant_id = restaurant.id, "Restaurant updated");
    Ok(Json(view(&state, restaurant)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_url_joins_base_and_slug() {
        assert_eq!(
            menu_url("https://comanda.app/", "bar-do-ze"),
            "https://comanda.app/cardapio/bar-do-ze"
        );
        assert_eq!(
            menu_url("http://localhost:8080", "pizzaria-2"),
            "http://localhost:8080/cardapio/pizzaria-2"
        );
    }

    #[test]
    fn fee_must_be_a_percentage() {
        let ok = RestaurantUpdate {
            service_fee_percent: Some(10.0),
            ..Default::default()
        };
        assert!(validate_update(&ok).is_ok());

        let bad = RestaurantUpdate {
            service_fee_percent: Some(150.0),
            ..Default::default()
        };
        assert_eq!(
            validate_update(&bad).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }
}
