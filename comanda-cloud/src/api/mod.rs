//! HTTP API for comanda-cloud
//!
//! ```text
//! /health                      public
//! /api/auth/*                  public, rate limited
//! /api/public/menu/{slug}      public JSON menu
//! /cardapio/{slug}             public HTML menu
//! /webhooks/pagarme            Basic auth (provider credentials)
//! /api/realtime/ws?token=      JWT in query string
//! /api/*                       JWT (Authorization: Bearer)
//! ```

pub mod auth;
pub mod billing;
pub mod catalog;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod integrations;
pub mod mesas;
pub mod orders;
pub mod public_menu;
pub mod realtime_ws;
pub mod restaurant;

use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use chrono::{NaiveDate, NaiveTime};
use http::{HeaderName, HeaderValue};
use shared::error::{AppError, ErrorCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::tenant_auth::auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Restaurants operate on Brasília time (UTC-3, no DST)
const LOCAL_OFFSET_SECS: i32 = -3 * 3600;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Parse `YYYY-MM-DD`
pub fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("{field} must be YYYY-MM-DD"))
            .with_detail("field", field)
    })
}

/// Start of a local day in Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    let utc_midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    utc_midnight - i64::from(LOCAL_OFFSET_SECS) * 1000
}

/// `[start, end)` of a local day in Unix millis
pub fn day_range(date: NaiveDate) -> (i64, i64) {
    let start = day_start_millis(date);
    (start, start + DAY_MILLIS)
}

/// Routes that need a dashboard session
fn tenant_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/restaurant",
            get(restaurant::get_restaurant).put(restaurant::update_restaurant),
        )
        // Catalog
        .route(
            "/api/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/categories/{id}",
            axum::routing::put(catalog::update_category).delete(catalog::delete_category),
        )
        .route(
            "/api/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/products/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/api/products/{id}/toggle-availability",
            post(catalog::toggle_availability),
        )
        // Orders and PDV
        .route("/api/orders", get(orders::list_orders))
        .route(
            "/api/orders/{id}",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/pdv/preview", post(orders::preview))
        .route("/api/pdv/finalize", post(orders::finalize))
        // Employees and permissions
        .route(
            "/api/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/api/employees/{id}",
            axum::routing::put(employees::update_employee).delete(employees::delete_employee),
        )
        .route("/api/employees/{id}/enable", post(employees::enable_employee))
        .route("/api/employees/{id}/disable", post(employees::disable_employee))
        .route(
            "/api/employees/{id}/permissions",
            get(employees::get_permissions).put(employees::replace_permissions),
        )
        .route(
            "/api/employees/{id}/permissions/reset",
            post(employees::reset_permissions),
        )
        // Areas and mesas
        .route("/api/areas", get(mesas::list_areas).post(mesas::create_area))
        .route(
            "/api/areas/{id}",
            axum::routing::put(mesas::update_area).delete(mesas::delete_area),
        )
        .route("/api/mesas", get(mesas::list_mesas).post(mesas::create_mesa))
        .route(
            "/api/mesas/{id}",
            axum::routing::put(mesas::update_mesa).delete(mesas::delete_mesa),
        )
        .route("/api/mesas/{id}/status", patch(mesas::set_mesa_status))
        .route("/api/mesas/{id}/close", post(mesas::close_mesa))
        // Integrations
        .route(
            "/api/whatsapp",
            get(integrations::get_whatsapp).put(integrations::put_whatsapp),
        )
        .route("/api/whatsapp/send", post(integrations::send_whatsapp))
        .route("/api/whatsapp/messages", get(integrations::list_messages))
        .route(
            "/api/ifood",
            get(integrations::get_ifood).put(integrations::put_ifood),
        )
        .route("/api/ifood/sync", post(integrations::sync_ifood))
        // Billing
        .route("/api/billing/subscription", get(billing::get_subscription))
        .route("/api/billing/subscribe", post(billing::subscribe))
        .route("/api/billing/cancel", post(billing::cancel))
        // Dashboard
        .route("/api/dashboard", get(dashboard::summary))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Routes reachable without a session
fn public_routes(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));
    let register = Router::new()
        .route("/api/auth/register", post(auth::register))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/public/menu/{slug}", get(public_menu::menu_json))
        .route("/cardapio/{slug}", get(public_menu::menu_html))
        .route("/webhooks/pagarme", post(billing::pagarme_webhook))
        .route("/api/realtime/ws", get(realtime_ws::handle_realtime_ws))
        .merge(login)
        .merge(register)
}

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(public_routes(&state))
        .merge(tenant_routes(&state))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::for_tests("http://127.0.0.1:9"))
    }

    #[test]
    fn day_range_is_local_midnight() {
        let date = parse_date("2025-03-10", "date").unwrap();
        let (start, end) = day_range(date);
        // 2025-03-10T03:00:00Z
        assert_eq!(start, 1_741_575_600_000);
        assert_eq!(end - start, DAY_MILLIS);
    }

    #[test]
    fn bad_dates_are_rejected() {
        let err = parse_date("10/03/2025", "date").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[tokio::test]
    async fn health_is_public() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn tenant_routes_need_a_token() {
        let resp = app()
            .oneshot(Request::get("/api/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app()
            .oneshot(
                Request::get("/api/orders")
                    .header("authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn pagarme_webhook_rejects_bad_credentials() {
        let resp = app()
            .oneshot(
                Request::post("/webhooks/pagarme")
                    .header("content-type", "application/json")
                    .header("authorization", "Basic aG9vazp3cm9uZw==")
                    .body(Body::from(r#"{"id":"hook_1","type":"invoice.paid","data":{}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
