use std::sync::Arc;
use std::time::Duration;

use actordeck_application::{
    ActorDetail, ActorListQuery, ApifyGateway, ApifyGatewayConnector, RunOptions,
};
use actordeck_core::{ApiKey, AppError, AppResult};
use actordeck_domain::{Actor, ApifyUser, Run, RunInput};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

mod payloads;

#[cfg(test)]
mod tests;

use payloads::{ActorPayload, DataEnvelope, ListPayload, RunPayload, UserPayload};

/// Builds [`HttpApifyGateway`] instances sharing one HTTP connection pool.
#[derive(Clone)]
pub struct HttpApifyGatewayConnector {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpApifyGatewayConnector {
    /// Creates a connector for the Apify REST API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!("invalid Apify API base URL '{base_url}': {error}"))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "Apify API base URL '{base_url}' cannot carry a path"
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }
}

impl ApifyGatewayConnector for HttpApifyGatewayConnector {
    fn connect(&self, api_key: &ApiKey) -> Arc<dyn ApifyGateway> {
        Arc::new(HttpApifyGateway {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            api_key: api_key.clone(),
        })
    }
}

/// Apify REST client bound to a single API key.
pub struct HttpApifyGateway {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: ApiKey,
}

impl HttpApifyGateway {
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Internal("Apify API base URL cannot carry a path".to_owned()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> AppResult<reqwest::Response> {
        let response = request
            .bearer_auth(self.api_key.expose())
            .send()
            .await
            .map_err(|error| AppError::upstream_transport(format!("{action} failed"), error))?;

        let status = response.status();
        debug!(action, status = status.as_u16(), "apify call finished");

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());

        Err(AppError::Upstream {
            status: Some(status.as_u16()),
            message: format!("{action} returned status {}", status.as_u16()),
            details: error_details(body),
        })
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> AppResult<T> {
        response.json::<T>().await.map_err(|error| {
            AppError::upstream_transport(format!("{action} returned an unreadable body"), error)
        })
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url, action: &str) -> AppResult<T> {
        let response = self.send(self.http_client.get(url), action).await?;
        let envelope = Self::read_json::<DataEnvelope<T>>(response, action).await?;
        Ok(envelope.data)
    }
}

/// Actor ids of the form `username/name` are addressed as `username~name`.
fn actor_path_id(actor_id: &str) -> String {
    actor_id.replace('/', "~")
}

/// Prefers the platform's `error` object, then the whole JSON body, then raw text.
fn error_details(body: String) -> Value {
    match serde_json::from_str::<Value>(body.as_str()) {
        Ok(mut value) => {
            let error = value.get_mut("error").map(Value::take);
            match error {
                Some(error) if !error.is_null() => error,
                _ => value,
            }
        }
        Err(_) => Value::String(body),
    }
}

#[async_trait]
impl ApifyGateway for HttpApifyGateway {
    async fn current_user(&self) -> AppResult<ApifyUser> {
        let url = self.endpoint(&["users", "me"])?;
        let user = self.get_data::<UserPayload>(url, "user lookup").await?;
        Ok(user.into())
    }

    async fn list_actors(&self, query: ActorListQuery) -> AppResult<Vec<Actor>> {
        let mut url = self.endpoint(&["acts"])?;
        url.query_pairs_mut()
            .append_pair("limit", query.limit.to_string().as_str())
            .append_pair("offset", query.offset.to_string().as_str())
            .append_pair("desc", if query.descending { "true" } else { "false" });

        let actors = self
            .get_data::<ListPayload<ActorPayload>>(url, "actor listing")
            .await?;

        Ok(actors.items.into_iter().map(Actor::from).collect())
    }

    async fn find_actor(&self, actor_id: &str) -> AppResult<ActorDetail> {
        let path_id = actor_path_id(actor_id);
        let url = self.endpoint(&["acts", path_id.as_str()])?;
        let actor = self.get_data::<ActorPayload>(url, "actor lookup").await?;
        Ok(actor.into_detail())
    }

    async fn start_run(
        &self,
        actor_id: &str,
        input: &RunInput,
        options: RunOptions,
    ) -> AppResult<Run> {
        let path_id = actor_path_id(actor_id);
        let mut url = self.endpoint(&["acts", path_id.as_str(), "runs"])?;
        url.query_pairs_mut()
            .append_pair(
                "waitForFinish",
                options.wait_for_finish_secs.to_string().as_str(),
            )
            .append_pair("memory", options.memory_mbytes.to_string().as_str());

        let response = self
            .send(self.http_client.post(url).json(input), "actor run start")
            .await?;
        let envelope =
            Self::read_json::<DataEnvelope<RunPayload>>(response, "actor run start").await?;

        Ok(envelope.data.into())
    }

    async fn find_run(&self, run_id: &str) -> AppResult<Run> {
        let url = self.endpoint(&["actor-runs", run_id])?;
        let run = self.get_data::<RunPayload>(url, "run lookup").await?;
        Ok(run.into())
    }

    async fn list_dataset_items(&self, dataset_id: &str) -> AppResult<Vec<Value>> {
        let url = self.endpoint(&["datasets", dataset_id, "items"])?;
        let response = self
            .send(self.http_client.get(url), "dataset read")
            .await?;

        Self::read_json::<Vec<Value>>(response, "dataset read").await
    }

    async fn run_log(&self, run_id: &str) -> AppResult<String> {
        let url = self.endpoint(&["actor-runs", run_id, "log"])?;
        let response = self.send(self.http_client.get(url), "run log read").await?;

        response.text().await.map_err(|error| {
            AppError::upstream_transport("run log read returned an unreadable body", error)
        })
    }
}
