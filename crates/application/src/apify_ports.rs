use std::sync::Arc;

use actordeck_core::{ApiKey, AppResult};
use actordeck_domain::{Actor, ActorSummary, ApifyUser, Run, RunInput};
use async_trait::async_trait;
use serde_json::Value;

/// Paging for the caller's own actor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorListQuery {
    /// Maximum number of actors.
    pub limit: u32,
    /// Number of actors to skip.
    pub offset: u32,
    /// Newest first when true.
    pub descending: bool,
}

impl Default for ActorListQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            descending: true,
        }
    }
}

/// Actor metadata relevant for building its input form.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDetail {
    /// Actor summary.
    pub summary: ActorSummary,
    /// Schema declared by the default build configuration.
    pub build_input_schema: Option<Value>,
    /// Schema declared on the actor itself.
    pub actor_input_schema: Option<Value>,
}

/// Run submission hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Seconds the platform may block waiting for the run to finish.
    pub wait_for_finish_secs: u32,
    /// Memory allocated to the run, in megabytes.
    pub memory_mbytes: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            wait_for_finish_secs: 60,
            memory_mbytes: 512,
        }
    }
}

/// Apify REST calls made on behalf of one API key.
///
/// Every call is a single attempt; failures are returned as-is.
#[async_trait]
pub trait ApifyGateway: Send + Sync {
    /// Returns the account owning the key.
    async fn current_user(&self) -> AppResult<ApifyUser>;

    /// Lists actors owned by the account.
    async fn list_actors(&self, query: ActorListQuery) -> AppResult<Vec<Actor>>;

    /// Fetches one actor.
    async fn find_actor(&self, actor_id: &str) -> AppResult<ActorDetail>;

    /// Starts a run of an actor.
    async fn start_run(&self, actor_id: &str, input: &RunInput, options: RunOptions)
    -> AppResult<Run>;

    /// Fetches a run.
    async fn find_run(&self, run_id: &str) -> AppResult<Run>;

    /// Fetches all items of a dataset.
    async fn list_dataset_items(&self, dataset_id: &str) -> AppResult<Vec<Value>>;

    /// Fetches the plain text log of a run.
    async fn run_log(&self, run_id: &str) -> AppResult<String>;
}

/// Creates gateways bound to an API key.
pub trait ApifyGatewayConnector: Send + Sync {
    /// Returns a gateway authenticating with `api_key`.
    fn connect(&self, api_key: &ApiKey) -> Arc<dyn ApifyGateway>;
}
