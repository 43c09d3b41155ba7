use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use actordeck_application::RunOptions;
use actordeck_core::{AppError, AppResult};
use actordeck_domain::ActorCapabilityRules;
use tracing_subscriber::EnvFilter;

const DEFAULT_APIFY_API_BASE_URL: &str = "https://api.apify.com/v2";

/// Runtime configuration of the proxy, read from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub app_env: String,
    pub frontend_urls: Vec<String>,
    pub cors_allowed_origin_suffixes: Vec<String>,
    pub apify_api_base_url: String,
    pub apify_request_timeout: Duration,
    pub run_options: RunOptions,
    pub capability_rules: ActorCapabilityRules,
}

impl ApiConfig {
    pub fn load() -> AppResult<Self> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parse_env_u16("API_PORT", 5000)?;
        let app_env = env::var("APP_ENV")
            .ok()
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "development".to_owned());

        let frontend_urls = env_list("FRONTEND_URLS", &["http://localhost:5173"]);
        let cors_allowed_origin_suffixes = env_list("CORS_ALLOWED_ORIGIN_SUFFIXES", &[".vercel.app"]);

        let apify_api_base_url = env::var("APIFY_API_BASE_URL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_APIFY_API_BASE_URL.to_owned());
        let timeout_secs = parse_env_u64("APIFY_REQUEST_TIMEOUT_SECS", 30)?;
        let wait_for_finish_secs = parse_env_u32("APIFY_RUN_WAIT_SECS", 60)?;
        let memory_mbytes = parse_env_u32("APIFY_RUN_MEMORY_MBYTES", 512)?;

        if timeout_secs == 0 {
            return Err(AppError::Validation(
                "APIFY_REQUEST_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        if memory_mbytes == 0 {
            return Err(AppError::Validation(
                "APIFY_RUN_MEMORY_MBYTES must be greater than zero".to_owned(),
            ));
        }

        let start_url_markers = env_list("START_URL_ACTOR_MARKERS", &[]);
        let capability_rules = if start_url_markers.is_empty() {
            ActorCapabilityRules::default()
        } else {
            ActorCapabilityRules::new(start_url_markers)?
        };

        Ok(Self {
            api_host,
            api_port,
            app_env,
            frontend_urls,
            cors_allowed_origin_suffixes,
            apify_api_base_url,
            apify_request_timeout: Duration::from_secs(timeout_secs),
            run_options: RunOptions {
                wait_for_finish_secs,
                memory_mbytes,
            },
            capability_rules,
        })
    }

    pub fn socket_address(&self) -> AppResult<SocketAddr> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Panic messages are only sent to clients outside production.
    pub fn expose_error_details(&self) -> bool {
        self.app_env != "production"
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn env_list(name: &str, default: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        _ => default.iter().map(|item| (*item).to_owned()).collect(),
    }
}

fn parse_env_u16(name: &str, default: u16) -> AppResult<u16> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u16>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
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
