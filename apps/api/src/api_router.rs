use std::any::Any;

use actordeck_core::AppError;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::api_config::ApiConfig;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


pub fn build_router(app_state: AppState, config: &ApiConfig) -> Router {
    let apify_routes = Router::new()
        .route(
            "/api/apify/validate",
            post(handlers::apify::validate_key_handler),
        )
        .route(
            "/api/apify/actors",
            get(handlers::apify::list_actors_handler),
        )
        .route(
            "/api/apify/actors/{actor_id}/schema",
            get(handlers::apify::actor_schema_handler),
        )
        .route(
            "/api/apify/actors/{actor_id}/execute",
            post(handlers::apify::execute_actor_handler),
        )
        .route(
            "/api/apify/runs/{run_id}",
            get(handlers::apify::run_status_handler),
        )
        .route_layer(from_fn(middleware::require_api_key));

    let expose_error_details = config.expose_error_details();

    Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .merge(apify_routes)
        .method_not_allowed_fallback(route_not_found)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| {
                panic_response(panic.as_ref(), expose_error_details)
            },
        ))
        .layer(from_fn(middleware::security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(
            &config.frontend_urls,
            &config.cors_allowed_origin_suffixes,
        ))
        .with_state(app_state)
}

async fn route_not_found() -> ApiError {
    AppError::NotFound("Route not found".to_owned()).into()
}

fn panic_response(panic: &(dyn Any + Send), expose_error_details: bool) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic payload".to_owned()
    };

    error!(panic = %detail, "request handler panicked");

    let payload =
        ErrorResponse::new("Internal server error").with_stack(expose_error_details.then_some(detail));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
