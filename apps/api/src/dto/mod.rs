mod apify;
mod common;

pub use apify::{
    ActorResponse, ActorSchemaResponse, ActorStatsResponse, ActorSummaryResponse,
    ActorsResponse, ApifyUserResponse, ExecuteActorRequest, ExecuteActorResponse,
    RunStatusResponse, ValidateKeyResponse,
};
pub use common::HealthResponse;
