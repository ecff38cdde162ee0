//! Liveness check

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health
///
/// Does not touch the database; a slow pool must not fail the check.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "comanda-cloud",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "realtime_channels": state.realtime.channel_count(),
    }))
}
