//! Baladiya HTTP API binary.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use baladiya_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("migrations applied");
        return Ok(());
    }

    let session_layer =
        api_services::build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
    let app_state = api_services::build_app_state(pool, &config)?;
    let app = api_router::build_router(app_state, &config, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "baladiya api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
