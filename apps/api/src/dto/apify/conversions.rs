use actordeck_application::ActorSchema;
use actordeck_domain::{Actor, ActorSummary, ApifyUser, RunResult};
use chrono::{DateTime, SecondsFormat, Utc};

use super::types::{
    ActorResponse, ActorSchemaResponse, ActorStatsResponse, ActorSummaryResponse,
    ApifyUserResponse, ExecuteActorResponse, RunStatusResponse,
};

fn timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|value| value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl From<ApifyUser> for ApifyUserResponse {
    fn from(value: ApifyUser) -> Self {
        Self {
            username: value.username,
            email: value.email,
        }
    }
}

impl From<Actor> for ActorResponse {
    fn from(value: Actor) -> Self {
        Self {
            id: value.id,
            name: value.name,
            title: value.title,
            description: value.description,
            username: value.username,
            is_public: value.is_public,
            stats: ActorStatsResponse {
                total_runs: value.stats.total_runs,
                last_run_at: timestamp(value.stats.last_run_at),
            },
        }
    }
}

impl From<ActorSummary> for ActorSummaryResponse {
    fn from(value: ActorSummary) -> Self {
        Self {
            id: value.id,
            name: value.name,
            title: value.title,
            description: value.description,
        }
    }
}

impl From<ActorSchema> for ActorSchemaResponse {
    fn from(value: ActorSchema) -> Self {
        Self {
            actor: value.actor.into(),
            input_schema: value.input_schema.into_value(),
        }
    }
}

impl From<RunResult> for ExecuteActorResponse {
    fn from(value: RunResult) -> Self {
        Self {
            run_id: value.run_id,
            status: value.status.as_str().to_owned(),
            started_at: timestamp(value.started_at),
            finished_at: timestamp(value.finished_at),
            stats: value.stats,
            results: value.results,
            warning: value.warning,
            message: value.message,
        }
    }
}

impl From<RunResult> for RunStatusResponse {
    fn from(value: RunResult) -> Self {
        Self {
            run_id: value.run_id,
            status: value.status.as_str().to_owned(),
            started_at: timestamp(value.started_at),
            finished_at: timestamp(value.finished_at),
            stats: value.stats,
            results: value.results.unwrap_or_default(),
            error_details: value.error_details,
            exit_code: value.exit_code,
        }
    }
}
