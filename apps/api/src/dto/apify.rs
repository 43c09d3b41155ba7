mod conversions;
mod types;

pub use types::{
    ActorResponse, ActorSchemaResponse, ActorStatsResponse, ActorSummaryResponse,
    ActorsResponse, ApifyUserResponse, ExecuteActorRequest, ExecuteActorResponse,
    RunStatusResponse, ValidateKeyResponse,
};
