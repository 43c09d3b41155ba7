//! Actordeck API: HTTP proxy in front of the Apify platform.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use actordeck_application::ActorService;
use actordeck_core::AppError;
use actordeck_infrastructure::HttpApifyGatewayConnector;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let connector = HttpApifyGatewayConnector::new(
        config.apify_api_base_url.as_str(),
        config.apify_request_timeout,
    )?;
    let actor_service = ActorService::new(Arc::new(connector))
        .with_capability_rules(config.capability_rules.clone())
        .with_run_options(config.run_options);

    let app = build_router(AppState { actor_service }, &config);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        app_env = %config.app_env,
        apify_api_base_url = %config.apify_api_base_url,
        "actordeck-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
