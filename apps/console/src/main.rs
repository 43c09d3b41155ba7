//! Actordeck terminal console: sign in, pick an actor, fill its input and follow the run.

#![forbid(unsafe_code)]

mod console_config;
mod prompt;
mod proxy_client;
mod render;
mod run_poller;
mod screens;
mod wizard;

use actordeck_core::AppError;
use tracing::info;

use crate::console_config::{ConsoleConfig, init_tracing};
use crate::screens::Console;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let results_dir = std::env::current_dir().map_err(|error| {
        AppError::Internal(format!("failed to resolve working directory: {error}"))
    })?;

    info!(
        api_base_url = %config.api_base_url,
        poll_interval_ms = config.poll_interval.as_millis(),
        "actordeck-console started"
    );

    Console::new(config, results_dir).run().await
}
