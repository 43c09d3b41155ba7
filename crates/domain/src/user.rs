use serde::{Deserialize, Serialize};

/// Platform account that owns an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApifyUser {
    /// Account username.
    pub username: String,
    /// Account email, when the platform discloses it.
    pub email: Option<String>,
}
