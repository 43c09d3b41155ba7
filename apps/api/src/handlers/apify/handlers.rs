use actordeck_core::ApiKey;
use actordeck_domain::RunInput;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use tracing::info;

use crate::dto::{
    ActorResponse, ActorSchemaResponse, ActorsResponse, ExecuteActorRequest,
    ExecuteActorResponse, RunStatusResponse, ValidateKeyResponse,
};
use crate::error::{ApiResult, ResultContext};
use crate::state::AppState;

pub async fn validate_key_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
) -> ApiResult<Json<ValidateKeyResponse>> {
    let user = state.actor_service.validate_api_key(&api_key).await?;

    Ok(Json(ValidateKeyResponse {
        valid: true,
        user: user.into(),
    }))
}

pub async fn list_actors_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
) -> ApiResult<Json<ActorsResponse>> {
    let actors = state
        .actor_service
        .list_actors(&api_key)
        .await
        .context("Failed to fetch actors")?;

    Ok(Json(ActorsResponse {
        actors: actors.into_iter().map(ActorResponse::from).collect(),
    }))
}

pub async fn actor_schema_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(actor_id): Path<String>,
) -> ApiResult<Json<ActorSchemaResponse>> {
    let schema = state
        .actor_service
        .actor_schema(&api_key, actor_id.as_str())
        .await
        .context("Failed to fetch actor schema")?;

    Ok(Json(schema.into()))
}

pub async fn execute_actor_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(actor_id): Path<String>,
    payload: Result<Json<ExecuteActorRequest>, JsonRejection>,
) -> ApiResult<Json<ExecuteActorResponse>> {
    let Json(payload) = payload?;
    let input = RunInput::from_value(payload.input)?;

    info!(actor_id = %actor_id, fields = input.len(), "actor execution requested");

    let result = state
        .actor_service
        .execute_actor(&api_key, actor_id.as_str(), input)
        .await
        .context("Failed to execute actor")?;

    Ok(Json(result.into()))
}

pub async fn run_status_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(run_id): Path<String>,
) -> ApiResult<Json<RunStatusResponse>> {
    let result = state
        .actor_service
        .run_status(&api_key, run_id.as_str())
        .await
        .context("Failed to get run status")?;

    Ok(Json(result.into()))
}
