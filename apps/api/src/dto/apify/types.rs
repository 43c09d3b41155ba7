use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Result of a successful key validation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/validate-key-response.ts"
)]
pub struct ValidateKeyResponse {
    pub valid: bool,
    pub user: ApifyUserResponse,
}

/// Account owning the validated key.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/apify-user-response.ts"
)]
pub struct ApifyUserResponse {
    pub username: String,
    pub email: Option<String>,
}

/// Actor catalog payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/actors-response.ts"
)]
pub struct ActorsResponse {
    pub actors: Vec<ActorResponse>,
}

/// API representation of an actor.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/actor-response.ts"
)]
pub struct ActorResponse {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub username: String,
    pub is_public: bool,
    pub stats: ActorStatsResponse,
}

/// Usage statistics of an actor.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/actor-stats-response.ts"
)]
pub struct ActorStatsResponse {
    #[ts(type = "number")]
    pub total_runs: u64,
    pub last_run_at: Option<String>,
}

/// Actor summary returned with its input schema.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/actor-summary-response.ts"
)]
pub struct ActorSummaryResponse {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
}

/// Actor and the JSON schema describing its input.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/actor-schema-response.ts"
)]
pub struct ActorSchemaResponse {
    pub actor: ActorSummaryResponse,
    #[ts(type = "Record<string, unknown>")]
    pub input_schema: Value,
}

/// Incoming payload for actor execution.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/execute-actor-request.ts"
)]
pub struct ExecuteActorRequest {
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub input: Option<Value>,
}

/// Outcome of an actor run within the synchronous wait window.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/execute-actor-response.ts"
)]
pub struct ExecuteActorResponse {
    pub run_id: String,
    pub status: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    #[ts(type = "unknown")]
    pub stats: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "Array<unknown> | undefined")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message: Option<String>,
}

/// Current state of a run, with results or error details when finished.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/run-status-response.ts"
)]
pub struct RunStatusResponse {
    pub run_id: String,
    pub status: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    #[ts(type = "unknown")]
    pub stats: Option<Value>,
    #[ts(type = "Array<unknown>")]
    pub results: Vec<Value>,
    pub error_details: Option<String>,
    #[ts(type = "number | null")]
    pub exit_code: Option<i64>,
}
