use std::time::Duration;

use actordeck_core::{API_KEY_PREFIX, ApiKey, AppError, AppResult};
use actordeck_domain::{Actor, ActorSummary, ApifyUser, InputSchema, RunInput, RunResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::run_poller::RunStatusSource;

const API_KEY_HEADER: &str = "x-apify-token";

/// Checks a typed key before any request leaves the console.
pub fn precheck_api_key(raw: &str) -> AppResult<ApiKey> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Unauthorized(
            "Please enter your Apify API key".to_owned(),
        ));
    }

    ApiKey::parse(Some(raw)).map_err(|_| {
        AppError::Unauthorized(format!(
            "Invalid API key format. Should start with \"{API_KEY_PREFIX}\""
        ))
    })
}

/// Actor with the schema describing its input, as served by the proxy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSchemaPayload {
    pub actor: ActorSummary,
    pub input_schema: InputSchema,
}

#[derive(Debug, Deserialize)]
struct ValidatePayload {
    user: ApifyUser,
}

#[derive(Debug, Deserialize)]
struct ActorsPayload {
    actors: Vec<Actor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorPayload {
    error: Option<String>,
    details: Option<Value>,
    received: Option<Value>,
}

/// HTTP client for the Actordeck proxy, bound to one session key.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http_client: Client,
    base_url: Url,
    api_key: ApiKey,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Duration, api_key: ApiKey) -> AppResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!("invalid proxy base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "proxy base URL '{base_url}' cannot carry paths"
            )));
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    pub async fn validate_key(&self) -> AppResult<ApifyUser> {
        let request = self
            .http_client
            .post(self.endpoint(&["apify", "validate"])?)
            .json(&json!({ "apiKey": self.api_key.expose() }));
        let payload: ValidatePayload = self.send(request).await?;
        Ok(payload.user)
    }

    pub async fn list_actors(&self) -> AppResult<Vec<Actor>> {
        let request = self.http_client.get(self.endpoint(&["apify", "actors"])?);
        let payload: ActorsPayload = self.send(request).await?;
        Ok(payload.actors)
    }

    pub async fn actor_schema(&self, actor_id: &str) -> AppResult<ActorSchemaPayload> {
        let request = self
            .http_client
            .get(self.endpoint(&["apify", "actors", actor_id, "schema"])?);
        self.send(request).await
    }

    pub async fn execute_actor(&self, actor_id: &str, input: RunInput) -> AppResult<RunResult> {
        let request = self
            .http_client
            .post(self.endpoint(&["apify", "actors", actor_id, "execute"])?)
            .json(&json!({ "input": input.into_value() }));
        self.send(request).await
    }

    pub async fn run_status(&self, run_id: &str) -> AppResult<RunResult> {
        let request = self
            .http_client
            .get(self.endpoint(&["apify", "runs", run_id])?);
        self.send(request).await
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Internal("proxy base URL cannot carry paths".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T>(&self, request: RequestBuilder) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await
            .map_err(|error| AppError::upstream_transport("proxy request failed", error))?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "proxy responded");

        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Internal(format!("failed to decode proxy response: {error}"))
        })
    }
}

#[async_trait]
impl RunStatusSource for ProxyClient {
    async fn run_status(&self, run_id: &str) -> AppResult<RunResult> {
        ProxyClient::run_status(self, run_id).await
    }
}

async fn error_from_response(status: StatusCode, response: Response) -> AppError {
    let body = response.text().await.unwrap_or_default();
    let (payload, raw) = match serde_json::from_str::<ErrorPayload>(&body) {
        Ok(payload) => (payload, None),
        Err(_) => (ErrorPayload::default(), Some(body)),
    };
    let message = payload
        .error
        .unwrap_or_else(|| format!("proxy returned status {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::BAD_REQUEST => AppError::InvalidField {
            message,
            received: payload.received,
        },
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Upstream {
            status: Some(status.as_u16()),
            message,
            details: payload
                .details
                .or_else(|| raw.map(Value::String))
                .unwrap_or(Value::Null),
        },
    }
}

/// One-line description of a failure as shown in the error banner.
pub fn describe_error(error: &AppError) -> String {
    match error {
        AppError::Upstream {
            message, details, ..
        } => match details {
            Value::String(text) if !text.is_empty() => format!("{message} ({text})"),
            Value::Null => message.clone(),
            Value::Object(fields) => match fields.get("message").and_then(Value::as_str) {
                Some(text) => format!("{message} ({text})"),
                None => message.clone(),
            },
            _ => message.clone(),
        },
        AppError::Unauthorized(message) | AppError::InvalidField { message, .. } => {
            message.clone()
        }
        AppError::NotFound(message) => message.clone(),
        other => other.to_string(),
    }
}
