use actordeck_core::{ApiKey, AppResult};
use actordeck_domain::InputSchema;

use super::{ActorSchema, ActorService};

impl ActorService {
    /// Fetches an actor and resolves the schema of its run input.
    pub async fn actor_schema(&self, api_key: &ApiKey, actor_id: &str) -> AppResult<ActorSchema> {
        let detail = self.gateway(api_key).find_actor(actor_id).await?;

        Ok(ActorSchema {
            actor: detail.summary,
            input_schema: InputSchema::resolve(
                detail.build_input_schema,
                detail.actor_input_schema,
            ),
        })
    }
}
