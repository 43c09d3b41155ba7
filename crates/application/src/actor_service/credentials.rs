use actordeck_core::{ApiKey, AppError, AppResult};
use actordeck_domain::ApifyUser;
use tracing::warn;

use super::ActorService;

impl ActorService {
    /// Confirms the key with the platform and returns its account.
    ///
    /// Any failure is reported as an invalid key; transport problems and
    /// rejected tokens are deliberately not told apart here.
    pub async fn validate_api_key(&self, api_key: &ApiKey) -> AppResult<ApifyUser> {
        self.gateway(api_key)
            .current_user()
            .await
            .map_err(|error| {
                warn!(error = %error, "api key validation failed");
                AppError::Unauthorized("Invalid API key or network error".to_owned())
            })
    }
}
