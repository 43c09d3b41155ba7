use actordeck_core::{ApiKey, AppResult};
use actordeck_domain::{Actor, fallback_actors};
use chrono::Utc;
use tracing::info;

use super::ActorService;
use crate::apify_ports::ActorListQuery;

impl ActorService {
    /// Lists the caller's actors, or the public fallback catalog when there are none.
    ///
    /// Listing failures are logged and treated like an empty account so the
    /// catalog is never empty.
    pub async fn list_actors(&self, api_key: &ApiKey) -> AppResult<Vec<Actor>> {
        let actors = match self
            .gateway(api_key)
            .list_actors(ActorListQuery::default())
            .await
        {
            Ok(actors) => actors,
            Err(error) => {
                info!(error = %error, "listing owned actors failed, using public actors");
                Vec::new()
            }
        };

        if actors.is_empty() {
            return Ok(fallback_actors(Utc::now()));
        }

        Ok(actors)
    }
}
