use actordeck_core::{AppError, AppResult};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
///
/// `context` names the failed operation ("Failed to fetch actors") and
/// becomes the `error` text of upstream and internal failures.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    context: Option<&'static str>,
}

impl ApiError {
    pub fn with_context(error: AppError, context: &'static str) -> Self {
        Self {
            error,
            context: Some(context),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self {
            error: value,
            context: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::from(AppError::Validation(value.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self.error {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, ErrorResponse::new(message)),
            AppError::InvalidField { message, received } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(message).with_received(received),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::invalid_credentials(message),
            ),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse::new(message)),
            error @ AppError::Upstream { .. } => {
                error!(context = self.context, error = %error, "upstream call failed");
                let message = self.context.map_or_else(|| error.to_string(), ToOwned::to_owned);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(message).with_details(error.details()),
                )
            }
            error @ AppError::Internal(_) => {
                error!(context = self.context, error = %error, "request failed");
                let message = self.context.unwrap_or("Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(message).with_details(error.details()),
                )
            }
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Attaches the failed operation's name to application errors.
pub trait ResultContext<T> {
    fn context(self, context: &'static str) -> ApiResult<T>;
}

impl<T> ResultContext<T> for AppResult<T> {
    fn context(self, context: &'static str) -> ApiResult<T> {
        self.map_err(|error| ApiError::with_context(error, context))
    }
}
