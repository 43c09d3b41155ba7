use std::fmt::{Debug, Formatter};

use crate::{AppError, AppResult};

/// Prefix every Apify personal API token starts with.
pub const API_KEY_PREFIX: &str = "apify_api_";

/// Apify API token that passed the surface format check.
///
/// The check is a guard against obvious typos, not a security control; the
/// platform remains the authority on whether the token is usable.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Parses a raw key as supplied by a caller.
    ///
    /// Missing or blank values are reported as a missing key, everything that
    /// does not start with [`API_KEY_PREFIX`] as a malformed one.
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        let Some(raw) = raw.filter(|value| !value.is_empty()) else {
            return Err(AppError::Unauthorized("API key is required".to_owned()));
        };

        if !raw.starts_with(API_KEY_PREFIX) {
            return Err(AppError::Unauthorized("Invalid API key format".to_owned()));
        }

        Ok(Self(raw.to_owned()))
    }

    /// Returns the token value for use as a bearer credential.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for ApiKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("ApiKey(apify_api_***)")
    }
}
