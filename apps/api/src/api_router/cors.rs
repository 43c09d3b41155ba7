use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::middleware::API_KEY_HEADER;

/// Allows the configured frontend origins plus any origin ending in one of `suffixes`.
pub(super) fn build_cors_layer(frontend_urls: &[String], suffixes: &[String]) -> CorsLayer {
    let frontend_urls = frontend_urls.to_vec();
    let suffixes = suffixes.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|origin| {
                    frontend_urls.iter().any(|allowed| allowed == origin)
                        || suffixes.iter().any(|suffix| origin.ends_with(suffix.as_str()))
                })
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
        ])
}
