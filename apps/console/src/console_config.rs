use std::env;
use std::time::Duration;

use actordeck_core::{AppError, AppResult};
use actordeck_domain::ActorCapabilityRules;
use tracing_subscriber::EnvFilter;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Runtime configuration of the console client.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub api_key: Option<String>,
    pub capability_rules: ActorCapabilityRules,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        let api_base_url = env::var("CONSOLE_API_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let poll_interval_ms = parse_env_u64("CONSOLE_POLL_INTERVAL_MS", 3000)?;
        let request_timeout_secs = parse_env_u64("CONSOLE_REQUEST_TIMEOUT_SECS", 30)?;
        let api_key = env::var("APIFY_TOKEN")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        if poll_interval_ms == 0 {
            return Err(AppError::Validation(
                "CONSOLE_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        if request_timeout_secs == 0 {
            return Err(AppError::Validation(
                "CONSOLE_REQUEST_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        let capability_rules = match env::var("START_URL_ACTOR_MARKERS") {
            Ok(value) if !value.trim().is_empty() => ActorCapabilityRules::new(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(ToOwned::to_owned)
                    .collect(),
            )?,
            _ => ActorCapabilityRules::default(),
        };

        Ok(Self {
            api_base_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            api_key,
            capability_rules,
        })
    }
}

/// Console logs stay quiet by default so they do not interleave with prompts.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}
