//! Areas and mesas (salão)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Area, AreaCreate, AreaUpdate, Mesa, MesaCreate, MesaStatus, MesaStatusUpdate, MesaUpdate,
    PermissionModule, validate_name,
};
use shared::realtime::{ChangeAction, ChangeEvent};

use super::ApiResult;
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::error::{internal, is_foreign_key_violation, is_unique_violation};
use crate::services::orders::{self, MesaClosed};
use crate::state::AppState;

pub const MAX_CAPACITY: i32 = 100;

async fn require_mesas_edit(state: &AppState, identity: &AuthIdentity) -> Result<(), AppError> {
    require_permission(state, identity, PermissionModule::Mesas, true).await
}

fn publish_mesa(state: &AppState, rid: i64, action: ChangeAction, mesa: &Mesa) {
    state
        .realtime
        .publish(ChangeEvent::for_row("mesas", action, rid, mesa));
}

// ── Areas ──

pub async fn list_areas(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
) -> ApiResult<Vec<Area>> {
    let areas = db::areas::list(&state.pool, identity.restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(areas))
}

fn area_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::new(ErrorCode::AreaNameExists)
    } else {
        internal(e)
    }
}

pub async fn create_area(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<AreaCreate>,
) -> ApiResult<Area> {
    require_mesas_edit(&state, &identity).await?;
    validate_name(&data.name, "name")?;
    let area = db::areas::create(&state.pool, identity.restaurant_id, &data)
        .await
        .map_err(area_conflict)?;
    Ok(Json(area))
}

pub async fn update_area(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<AreaUpdate>,
) -> ApiResult<Area> {
    require_mesas_edit(&state, &identity).await?;
    if let Some(name) = &data.name {
        validate_name(name, "name")?;
    }
    let area = db::areas::update(&state.pool, identity.restaurant_id, id, &data)
        .await
        .map_err(area_conflict)?
        .ok_or_else(|| AppError::new(ErrorCode::AreaNotFound))?;
    Ok(Json(area))
}

pub async fn delete_area(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    require_mesas_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    if db::areas::has_mesas(&state.pool, rid, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::AreaHasMesas));
    }
    let deleted = db::areas::delete(&state.pool, rid, id)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::new(ErrorCode::AreaHasMesas)
            } else {
                internal(e)
            }
        })?;
    if !deleted {
        return Err(AppError::new(ErrorCode::AreaNotFound));
    }
    Ok(Json(true))
}

// ── Mesas ──

#[derive(Debug, Deserialize)]
pub struct MesaQuery {
    pub area_id: Option<i64>,
}

pub async fn list_mesas(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<MesaQuery>,
) -> ApiResult<Vec<Mesa>> {
    let mesas = db::mesas::list(&state.pool, identity.restaurant_id, query.area_id)
        .await
        .map_err(internal)?;
    Ok(Json(mesas))
}

fn validate_mesa(number: Option<i32>, capacity: Option<i32>) -> Result<(), AppError> {
    if let Some(number) = number
        && number <= 0
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "mesa number must be positive",
        )
        .with_detail("field", "number"));
    }
    if let Some(capacity) = capacity
        && !(1..=MAX_CAPACITY).contains(&capacity)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("capacity must be between 1 and {MAX_CAPACITY}"),
        )
        .with_detail("field", "capacity"));
    }
    Ok(())
}

async fn ensure_area(state: &AppState, rid: i64, area_id: Option<i64>) -> Result<(), AppError> {
    if let Some(area_id) = area_id
        && !db::areas::exists(&state.pool, rid, area_id)
            .await
            .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::AreaNotFound).with_detail("area_id", area_id));
    }
    Ok(())
}

fn mesa_conflict(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::new(ErrorCode::MesaNumberExists)
    } else {
        internal(e)
    }
}

pub async fn create_mesa(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(data): Json<MesaCreate>,
) -> ApiResult<Mesa> {
    require_mesas_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    validate_mesa(Some(data.number), Some(data.capacity))?;
    ensure_area(&state, rid, data.area_id).await?;

    let mesa = db::mesas::create(&state.pool, rid, &data)
        .await
        .map_err(mesa_conflict)?;
    publish_mesa(&state, rid, ChangeAction::Insert, &mesa);
    Ok(Json(mesa))
}

pub async fn update_mesa(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<MesaUpdate>,
) -> ApiResult<Mesa> {
    require_mesas_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    validate_mesa(data.number, data.capacity)?;
    ensure_area(&state, rid, data.area_id).await?;

    let mesa = db::mesas::update(&state.pool, rid, id, &data)
        .await
        .map_err(mesa_conflict)?
        .ok_or_else(|| AppError::new(ErrorCode::MesaNotFound))?;
    publish_mesa(&state, rid, ChangeAction::Update, &mesa);
    Ok(Json(mesa))
}

/// PATCH /api/mesas/{id}/status (livre / ocupada / reservada)
pub async fn set_mesa_status(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<MesaStatusUpdate>,
) -> ApiResult<Mesa> {
    require_mesas_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    let mut conn = state.pool.acquire().await.map_err(internal)?;
    let mesa = db::mesas::set_status(&mut *conn, rid, id, req.status)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MesaNotFound))?;
    publish_mesa(&state, rid, ChangeAction::Update, &mesa);
    Ok(Json(mesa))
}

/// POST /api/mesas/{id}/close: deliver open orders and free the mesa
pub async fn close_mesa(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<MesaClosed> {
    require_mesas_edit(&state, &identity).await?;
    let closed = orders::close_mesa(&state, identity.restaurant_id, id).await?;
    Ok(Json(closed))
}

pub async fn delete_mesa(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    require_mesas_edit(&state, &identity).await?;
    let rid = identity.restaurant_id;
    let mesa = db::mesas::find(&state.pool, rid, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MesaNotFound))?;
    if mesa.status == MesaStatus::Ocupada {
        return Err(AppError::new(ErrorCode::MesaOccupied));
    }

    if !db::mesas::delete(&state.pool, rid, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::MesaNotFound));
    }
    state.realtime.publish(ChangeEvent::deleted("mesas", rid, id));
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesa_bounds() {
        assert!(validate_mesa(Some(1), Some(4)).is_ok());
        assert!(validate_mesa(None, None).is_ok());
        assert_eq!(
            validate_mesa(Some(0), None).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert!(validate_mesa(None, Some(0)).is_err());
        assert!(validate_mesa(None, Some(MAX_CAPACITY + 1)).is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn area_with_mesas_cannot_be_deleted(pool: sqlx::PgPool) {
        use crate::db::fixtures;

        let state = AppState::for_test_pool(pool.clone(), "http://127.0.0.1:9");
        let (restaurant, owner) = fixtures::restaurant(&pool, "churrascaria").await;
        let rid = restaurant.id;
        let area = fixtures::area(&pool, rid, "Varanda").await;
        let mesa = fixtures::mesa(&pool, rid, Some(area.id), 1).await;

        let err = delete_area(State(state.clone()), Extension(owner), Path(area.id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AreaHasMesas);
        assert!(db::areas::exists(&pool, rid, area.id).await.unwrap());

        db::mesas::delete(&pool, rid, mesa.id).await.unwrap();
        let Json(deleted) = delete_area(State(state), Extension(owner), Path(area.id))
            .await
            .unwrap();
        assert!(deleted);
    }
}
