use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use actordeck_application::{ActorListQuery, ApifyGatewayConnector, RunOptions};
use actordeck_core::{ApiKey, AppError};
use actordeck_domain::{RunInput, RunStatus};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::HttpApifyGatewayConnector;

const GOOD_TOKEN: &str = "apify_api_good";

#[derive(Debug, Clone)]
struct RecordedRun {
    actor_id: String,
    query: HashMap<String, String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeApify {
    list_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    runs: Arc<Mutex<Vec<RecordedRun>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {GOOD_TOKEN}").as_str())
}

fn token_rejected() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"type": "token-not-valid", "message": "Authentication token is not valid."}})),
    )
        .into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return token_rejected();
    }

    Json(json!({"data": {"id": "u1", "username": "jane", "email": "jane@example.com"}}))
        .into_response()
}

async fn list_actors(
    State(state): State<FakeApify>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.list_queries.lock().await.push(query);

    Json(json!({
        "data": {
            "total": 1,
            "items": [{
                "id": "a1",
                "name": "my-actor",
                "title": null,
                "username": "jane",
                "stats": {"totalRuns": 7, "lastRunAt": "2024-05-01T10:00:00.000Z"}
            }]
        }
    }))
}

async fn find_actor(Path(actor_id): Path<String>) -> Response {
    if actor_id != "apify~web-scraper" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"type": "record-not-found", "message": "Actor was not found"}})),
        )
            .into_response();
    }

    Json(json!({
        "data": {
            "id": "moJRLRc85AitArpNN",
            "name": "web-scraper",
            "title": "Web Scraper",
            "description": "Crawls websites",
            "defaultRunOptions": {
                "build": {"inputSchema": {"title": "from build", "properties": {}}},
                "memoryMbytes": 1024
            },
            "inputSchema": {"title": "from actor"}
        }
    }))
    .into_response()
}

async fn start_run(
    State(state): State<FakeApify>,
    Path(actor_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.runs.lock().await.push(RecordedRun {
        actor_id,
        query,
        body,
    });

    Json(json!({
        "data": {
            "id": "run-1",
            "status": "SUCCEEDED",
            "startedAt": "2024-05-01T10:00:00.000Z",
            "finishedAt": "2024-05-01T10:00:12.000Z",
            "stats": {"computeUnits": 0.02, "runTimeSecs": 12},
            "defaultDatasetId": "D1"
        }
    }))
}

async fn find_run(Path(run_id): Path<String>) -> Json<Value> {
    Json(json!({
        "data": {
            "id": run_id,
            "status": "FAILED",
            "startedAt": "2024-05-01T10:00:00.000Z",
            "finishedAt": null,
            "defaultDatasetId": "D1",
            "exitCode": 1
        }
    }))
}

async fn run_log(Path(_run_id): Path<String>) -> &'static str {
    "INFO starting\nERROR timeout occurred\n"
}

async fn dataset_items(Path(dataset_id): Path<String>) -> Response {
    if dataset_id == "broken" {
        return (StatusCode::BAD_GATEWAY, "upstream exploded").into_response();
    }

    Json(json!([{"url": "https://apify.com", "title": "Apify"}])).into_response()
}

async fn spawn_fake_apify(state: FakeApify) -> String {
    let router = Router::new()
        .route("/v2/users/me", get(current_user))
        .route("/v2/acts", get(list_actors))
        .route("/v2/acts/{actor_id}", get(find_actor))
        .route("/v2/acts/{actor_id}/runs", post(start_run))
        .route("/v2/actor-runs/{run_id}", get(find_run))
        .route("/v2/actor-runs/{run_id}/log", get(run_log))
        .route("/v2/datasets/{dataset_id}/items", get(dataset_items))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|_| unreachable!());
    let address = listener
        .local_addr()
        .unwrap_or_else(|_| unreachable!());

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{address}/v2/")
}

fn connector(base_url: &str) -> HttpApifyGatewayConnector {
    let connector = HttpApifyGatewayConnector::new(base_url, Duration::from_secs(5));
    assert!(connector.is_ok());
    connector.unwrap_or_else(|_| unreachable!())
}

fn api_key(raw: &str) -> ApiKey {
    ApiKey::parse(Some(raw)).unwrap_or_else(|_| unreachable!())
}

#[test]
fn connector_rejects_unusable_base_url() {
    let result = HttpApifyGatewayConnector::new("not a url", Duration::from_secs(1));
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = HttpApifyGatewayConnector::new("mailto:ops@example.com", Duration::from_secs(1));
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn current_user_sends_bearer_token() {
    let base_url = spawn_fake_apify(FakeApify::default()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));

    let user = gateway.current_user().await;
    assert!(user.is_ok());
    let user = user.unwrap_or_else(|_| unreachable!());
    assert_eq!(user.username, "jane");
    assert_eq!(user.email.as_deref(), Some("jane@example.com"));
}

#[tokio::test]
async fn rejected_token_keeps_upstream_error_payload() {
    let base_url = spawn_fake_apify(FakeApify::default()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key("apify_api_other"));

    let result = gateway.current_user().await;
    match result {
        Err(AppError::Upstream {
            status, details, ..
        }) => {
            assert_eq!(status, Some(401));
            assert_eq!(details["type"], json!("token-not-valid"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn list_actors_forwards_paging_and_maps_items() {
    let state = FakeApify::default();
    let base_url = spawn_fake_apify(state.clone()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));

    let actors = gateway.list_actors(ActorListQuery::default()).await;
    assert!(actors.is_ok());
    let actors = actors.unwrap_or_default();
    assert_eq!(actors.len(), 1);
    assert_eq!(actors[0].title, "my-actor");
    assert_eq!(actors[0].stats.total_runs, 7);
    assert!(actors[0].stats.last_run_at.is_some());

    let queries = state.list_queries.lock().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("50"));
    assert_eq!(queries[0].get("offset").map(String::as_str), Some("0"));
    assert_eq!(queries[0].get("desc").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn find_actor_addresses_named_actors_with_tilde() {
    let base_url = spawn_fake_apify(FakeApify::default()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));

    let detail = gateway.find_actor("apify/web-scraper").await;
    assert!(detail.is_ok());
    let detail = detail.unwrap_or_else(|_| unreachable!());
    assert_eq!(detail.summary.title, "Web Scraper");
    assert_eq!(
        detail.build_input_schema,
        Some(json!({"title": "from build", "properties": {}}))
    );
    assert_eq!(detail.actor_input_schema, Some(json!({"title": "from actor"})));
}

#[tokio::test]
async fn find_actor_surfaces_not_found_as_upstream_error() {
    let base_url = spawn_fake_apify(FakeApify::default()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));

    let result = gateway.find_actor("apify/missing").await;
    assert!(matches!(
        result,
        Err(AppError::Upstream {
            status: Some(404),
            ..
        })
    ));
}

#[tokio::test]
async fn start_run_posts_input_with_wait_and_memory() {
    let state = FakeApify::default();
    let base_url = spawn_fake_apify(state.clone()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));
    let input = RunInput::from_value(Some(json!({
        "startUrls": [{"url": "https://apify.com", "method": "GET"}]
    })))
    .unwrap_or_default();

    let run = gateway
        .start_run("apify/web-scraper", &input, RunOptions::default())
        .await;
    assert!(run.is_ok());
    let run = run.unwrap_or_else(|_| unreachable!());
    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(run.default_dataset_id.as_deref(), Some("D1"));
    assert!(run.finished_at.is_some());

    let runs = state.runs.lock().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].actor_id, "apify~web-scraper");
    assert_eq!(runs[0].query.get("waitForFinish").map(String::as_str), Some("60"));
    assert_eq!(runs[0].query.get("memory").map(String::as_str), Some("512"));
    assert_eq!(runs[0].body, input.into_value());
}

#[tokio::test]
async fn run_lookup_log_and_dataset_reads() {
    let base_url = spawn_fake_apify(FakeApify::default()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));

    let run = gateway
        .find_run("run-9")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(run.id, "run-9");
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.exit_code, Some(1));
    assert_eq!(run.finished_at, None);

    let log = gateway.run_log("run-9").await.unwrap_or_default();
    assert!(log.contains("ERROR timeout occurred"));

    let items = gateway.list_dataset_items("D1").await.unwrap_or_default();
    assert_eq!(items, vec![json!({"url": "https://apify.com", "title": "Apify"})]);
}

#[tokio::test]
async fn non_json_failure_keeps_raw_body() {
    let base_url = spawn_fake_apify(FakeApify::default()).await;
    let gateway = connector(base_url.as_str()).connect(&api_key(GOOD_TOKEN));

    let result = gateway.list_dataset_items("broken").await;
    match result {
        Err(AppError::Upstream {
            status, details, ..
        }) => {
            assert_eq!(status, Some(502));
            assert_eq!(details, json!("upstream exploded"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_platform_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|_| unreachable!());
    let address = listener
        .local_addr()
        .unwrap_or_else(|_| unreachable!());
    drop(listener);

    let gateway = connector(format!("http://{address}/v2").as_str()).connect(&api_key(GOOD_TOKEN));
    let result = gateway.current_user().await;

    assert!(matches!(result, Err(AppError::Upstream { status: None, .. })));
}
