use actordeck_core::{ApiKey, AppError};
use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use crate::error::ApiResult;

/// Header carrying the caller's Apify token.
pub const API_KEY_HEADER: &str = "x-apify-token";

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Resolves the caller's API key and stores it in the request extensions.
///
/// The `x-apify-token` header wins; when it is absent or empty the JSON body
/// field `apiKey` is used. The body is buffered for that and handed on intact.
pub async fn require_api_key(request: Request, next: Next) -> ApiResult<Response> {
    let header_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let (api_key, mut request) = match header_key {
        Some(raw) => (ApiKey::parse(Some(raw.as_str()))?, request),
        None => {
            let (parts, body) = request.into_parts();
            let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|error| {
                AppError::Validation(format!("failed to read request body: {error}"))
            })?;
            let api_key = ApiKey::parse(body_api_key(&bytes).as_deref())?;
            (api_key, Request::from_parts(parts, Body::from(bytes)))
        }
    };

    request.extensions_mut().insert(api_key);
    Ok(next.run(request).await)
}

fn body_api_key(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(bytes)
        .ok()?
        .get("apiKey")?
        .as_str()
        .map(ToOwned::to_owned)
}

pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    response
}
