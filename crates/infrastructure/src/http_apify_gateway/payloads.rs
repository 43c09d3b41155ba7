use actordeck_application::ActorDetail;
use actordeck_domain::{Actor, ActorStats, ActorSummary, ApifyUser, Run, RunStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Every Apify resource response wraps its payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub(super) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListPayload<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserPayload {
    username: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserPayload> for ApifyUser {
    fn from(value: UserPayload) -> Self {
        Self {
            username: value.username,
            email: value.email,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ActorStatsPayload {
    #[serde(default)]
    total_runs: Option<u64>,
    #[serde(default)]
    last_run_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ActorPayload {
    id: String,
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    stats: Option<ActorStatsPayload>,
    #[serde(default)]
    default_run_options: Option<Value>,
    #[serde(default)]
    input_schema: Option<Value>,
}

impl ActorPayload {
    pub(super) fn into_detail(self) -> ActorDetail {
        // `build` is usually a tag string; only an object can carry a schema.
        let build_input_schema = self
            .default_run_options
            .as_ref()
            .and_then(|options| options.get("build"))
            .and_then(|build| build.get("inputSchema"))
            .cloned();

        ActorDetail {
            summary: ActorSummary::new(self.id, self.name, self.title, self.description),
            build_input_schema,
            actor_input_schema: self.input_schema,
        }
    }
}

impl From<ActorPayload> for Actor {
    fn from(value: ActorPayload) -> Self {
        let stats = value.stats.unwrap_or_default();
        let title = value
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| value.name.clone());

        Self {
            id: value.id,
            name: value.name,
            title,
            description: value.description,
            username: value.username.unwrap_or_default(),
            is_public: value.is_public,
            stats: ActorStats {
                total_runs: stats.total_runs.unwrap_or(0),
                last_run_at: stats.last_run_at,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RunPayload {
    id: String,
    status: RunStatus,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    stats: Option<Value>,
    #[serde(default)]
    default_dataset_id: Option<String>,
    #[serde(default)]
    exit_code: Option<i64>,
}

impl From<RunPayload> for Run {
    fn from(value: RunPayload) -> Self {
        Self {
            id: value.id,
            status: value.status,
            started_at: value.started_at,
            finished_at: value.finished_at,
            stats: value.stats,
            default_dataset_id: value.default_dataset_id,
            exit_code: value.exit_code,
        }
    }
}
