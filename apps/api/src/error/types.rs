use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    /// Present and `false` on credential failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    valid: Option<bool>,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    received: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    stack: Option<String>,
}

impl ErrorResponse {
    pub(crate) fn new(error: impl Into<String>) -> Self {
        Self {
            valid: None,
            error: error.into(),
            details: None,
            received: None,
            stack: None,
        }
    }

    pub(crate) fn invalid_credentials(error: impl Into<String>) -> Self {
        Self {
            valid: Some(false),
            ..Self::new(error)
        }
    }

    pub(crate) fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub(crate) fn with_received(mut self, received: Option<Value>) -> Self {
        self.received = received;
        self
    }

    pub(crate) fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }
}
