//! Daily dashboard summary

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use shared::models::PermissionModule;

use super::{ApiResult, LOCAL_OFFSET_SECS, day_range, parse_date};
use crate::auth::{AuthIdentity, require_permission};
use crate::db;
use crate::db::dashboard::DashboardSummary;
use crate::error::internal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// `YYYY-MM-DD`, defaults to today (local)
    pub date: Option<String>,
}

fn local_today() -> NaiveDate {
    (Utc::now() + Duration::seconds(i64::from(LOCAL_OFFSET_SECS))).date_naive()
}

/// GET /api/dashboard?date=
pub async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthIdentity>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardSummary> {
    require_permission(&state, &identity, PermissionModule::Dashboard, false).await?;
    let date = match query.date.as_deref() {
        Some(value) => parse_date(value, "date")?,
        None => local_today(),
    };
    let (from, to) = day_range(date);
    let summary = db::dashboard::summary(&state.pool, identity.restaurant_id, from, to)
        .await
        .map_err(internal)?;
    Ok(Json(summary))
}
