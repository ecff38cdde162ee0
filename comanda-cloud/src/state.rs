//! Application state for comanda-cloud

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;
use crate::error::BoxError;
use crate::integrations::{
    http_client, ifood::IfoodClient, pagarme::PagarmeClient, whatsapp::WhatsAppClient,
};
use crate::live::RealtimeHub;
use crate::menu::MenuRenderer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// JWT secret for dashboard sessions
    pub jwt_secret: String,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    /// Per-restaurant change feed
    pub realtime: RealtimeHub,
    pub menu: MenuRenderer,
    pub whatsapp: WhatsAppClient,
    pub ifood: IfoodClient,
    pub pagarme: PagarmeClient,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Self::with_pool(config, pool)
    }

    /// Build the state around an existing pool
    pub fn with_pool(config: &Config, pool: PgPool) -> Result<Self, BoxError> {
        let http = http_client();
        Ok(Self {
            pool,
            config: Arc::new(config.clone()),
            jwt_secret: config.jwt_secret.clone(),
            rate_limiter: RateLimiter::new(),
            realtime: RealtimeHub::new(),
            menu: MenuRenderer::new()?,
            whatsapp: WhatsAppClient::new(
                http.clone(),
                &config.ultramsg_base_url,
                &config.twilio_base_url,
            ),
            ifood: IfoodClient::new(http.clone(), &config.ifood_base_url),
            pagarme: PagarmeClient::new(http, &config.pagarme_base_url, &config.pagarme_secret_key),
        })
    }

    /// State over a lazy pool that never connects; for router tests
    #[cfg(test)]
    pub fn for_tests(base_url: &str) -> Self {
        let config = Config::for_tests(base_url);
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        Self::with_pool(&config, pool).unwrap()
    }

    /// State over a migrated test database; upstreams point at `base_url`
    #[cfg(test)]
    pub fn for_test_pool(pool: PgPool, base_url: &str) -> Self {
        Self::with_pool(&Config::for_tests(base_url), pool).unwrap()
    }
}
