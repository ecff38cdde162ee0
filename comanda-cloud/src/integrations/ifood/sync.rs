//! iFood polling
//!
//! [`sync_restaurant`] runs one round for a merchant: poll events, import
//! placed orders, cancel cancelled ones, acknowledge what was handled.
//! Events that failed stay unacknowledged and come back on the next poll.
//!
//! [`IfoodSyncWorker`] repeats that for every enabled integration.

use std::collections::HashSet;

use shared::error::AppError;
use shared::models::{IfoodIntegration, IfoodSyncReport};
use shared::util::now_millis;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::client::{EventKind, IfoodEvent};
use super::mapper::{IfoodAction, to_order_create};
use crate::db;
use crate::error::ServiceResult;
use crate::services::orders;
use crate::state::AppState;

/// One polling round for a restaurant
pub async fn sync_restaurant(
    state: &AppState,
    integration: &IfoodIntegration,
) -> ServiceResult<IfoodSyncReport> {
    let restaurant_id = integration.restaurant_id;
    let events = state
        .ifood
        .poll_events(integration)
        .await
        .map_err(AppError::from)?;

    let mut report = IfoodSyncReport {
        events: events.len(),
        ..IfoodSyncReport::default()
    };
    if events.is_empty() {
        db::ifood::touch_polled(&state.pool, restaurant_id, now_millis()).await?;
        return Ok(report);
    }

    let known_products: HashSet<i64> = db::products::ids(&state.pool, restaurant_id)
        .await?
        .into_iter()
        .collect();

    let mut handled: Vec<IfoodEvent> = Vec::with_capacity(events.len());
    let mut seen: HashSet<(EventKind, String)> = HashSet::new();

    for event in events {
        let kind = event.kind();
        // same order repeated in one batch
        if !seen.insert((kind, event.order_id.clone())) {
            handled.push(event);
            continue;
        }
        let outcome = match kind {
            EventKind::Placed => {
                import_placed(state, integration, &event, &known_products, &mut report).await
            }
            EventKind::Cancelled => orders::cancel_external(state, restaurant_id, &event.order_id)
                .await
                .map(|cancelled| {
                    if cancelled.is_some() {
                        report.cancelled += 1;
                    }
                }),
            EventKind::Other => Ok(()),
        };
        match outcome {
            Ok(()) => handled.push(event),
            Err(e) => {
                let err: AppError = e.into();
                tracing::warn!(
                    restaurant_id,
                    event_id = %event.id,
                    order_id = %event.order_id,
                    "iFood event failed, will retry: {}",
                    err.message
                );
            }
        }
    }

    state
        .ifood
        .acknowledge(integration, &handled)
        .await
        .map_err(AppError::from)?;
    db::ifood::touch_polled(&state.pool, restaurant_id, now_millis()).await?;

    tracing::info!(
        restaurant_id,
        events = report.events,
        imported = report.imported,
        duplicates = report.duplicates,
        cancelled = report.cancelled,
        "iFood sync round finished"
    );
    Ok(report)
}

async fn import_placed(
    state: &AppState,
    integration: &IfoodIntegration,
    event: &IfoodEvent,
    known_products: &HashSet<i64>,
    report: &mut IfoodSyncReport,
) -> ServiceResult<()> {
    let restaurant_id = integration.restaurant_id;
    let order = state
        .ifood
        .order_details(integration, &event.order_id)
        .await
        .map_err(AppError::from)?;
    let create = to_order_create(&order, known_products);

    match orders::import_external(state, restaurant_id, &create).await? {
        Some(_) => {
            report.imported += 1;
            if integration.auto_confirm
                && let Err(e) = state
                    .ifood
                    .perform(integration, &event.order_id, IfoodAction::Confirm)
                    .await
            {
                tracing::warn!(restaurant_id, order_id = %event.order_id, error = %e, "iFood auto-confirm failed");
            }
        }
        None => report.duplicates += 1,
    }
    Ok(())
}

/// Background poller over all enabled integrations
pub struct IfoodSyncWorker {
    state: AppState,
    interval: Duration,
    shutdown: CancellationToken,
}

impl IfoodSyncWorker {
    pub fn new(state: AppState, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            state,
            interval,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "IfoodSyncWorker started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    tracing::info!("IfoodSyncWorker shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.sync_all().await;
                }
            }
        }

        tracing::info!("IfoodSyncWorker stopped");
    }

    async fn sync_all(&self) {
        let integrations = match db::ifood::list_enabled(&self.state.pool).await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!("Failed to load iFood integrations: {e}");
                return;
            }
        };

        for integration in &integrations {
            if self.shutdown.is_cancelled() {
                return;
            }
            if let Err(e) = sync_restaurant(&self.state, integration).await {
                let err: AppError = e.into();
                tracing::error!(
                    restaurant_id = integration.restaurant_id,
                    code = err.code.code(),
                    "iFood sync failed: {}",
                    err.message
                );
            }
        }
    }
}
