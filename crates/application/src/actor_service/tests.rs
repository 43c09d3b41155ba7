use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use actordeck_core::{ApiKey, AppError, AppResult};
use actordeck_domain::{
    Actor, ActorStats, ActorSummary, ApifyUser, FALLBACK_ACTOR_IDS, NOT_COMPLETED_MESSAGE,
    RESULTS_PENDING_WARNING, Run, RunInput, RunStatus, STILL_RUNNING_MESSAGE,
};

use crate::apify_ports::{
    ActorDetail, ActorListQuery, ApifyGateway, ApifyGatewayConnector, RunOptions,
};

use super::ActorService;

#[derive(Default)]
struct FakeGateway {
    user: Option<ApifyUser>,
    owned_actors: Option<Vec<Actor>>,
    actor_detail: Option<ActorDetail>,
    run: Option<Run>,
    dataset_items: Option<Vec<Value>>,
    log: Option<String>,
    list_queries: Mutex<Vec<ActorListQuery>>,
    started_runs: Mutex<Vec<(String, Value, RunOptions)>>,
    dataset_fetches: AtomicUsize,
    log_fetches: AtomicUsize,
}

fn upstream_failure() -> AppError {
    AppError::Upstream {
        status: Some(500),
        message: "simulated upstream failure".to_owned(),
        details: json!({"type": "internal-error"}),
    }
}

#[async_trait]
impl ApifyGateway for FakeGateway {
    async fn current_user(&self) -> AppResult<ApifyUser> {
        self.user.clone().ok_or_else(upstream_failure)
    }

    async fn list_actors(&self, query: ActorListQuery) -> AppResult<Vec<Actor>> {
        self.list_queries.lock().await.push(query);
        self.owned_actors.clone().ok_or_else(upstream_failure)
    }

    async fn find_actor(&self, _actor_id: &str) -> AppResult<ActorDetail> {
        self.actor_detail.clone().ok_or_else(upstream_failure)
    }

    async fn start_run(
        &self,
        actor_id: &str,
        input: &RunInput,
        options: RunOptions,
    ) -> AppResult<Run> {
        self.started_runs.lock().await.push((
            actor_id.to_owned(),
            input.clone().into_value(),
            options,
        ));
        self.run.clone().ok_or_else(upstream_failure)
    }

    async fn find_run(&self, _run_id: &str) -> AppResult<Run> {
        self.run.clone().ok_or_else(upstream_failure)
    }

    async fn list_dataset_items(&self, _dataset_id: &str) -> AppResult<Vec<Value>> {
        self.dataset_fetches.fetch_add(1, Ordering::SeqCst);
        self.dataset_items.clone().ok_or_else(upstream_failure)
    }

    async fn run_log(&self, _run_id: &str) -> AppResult<String> {
        self.log_fetches.fetch_add(1, Ordering::SeqCst);
        self.log.clone().ok_or_else(upstream_failure)
    }
}

struct FakeConnector {
    gateway: Arc<FakeGateway>,
    connections: AtomicUsize,
}

impl ApifyGatewayConnector for FakeConnector {
    fn connect(&self, _api_key: &ApiKey) -> Arc<dyn ApifyGateway> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        self.gateway.clone()
    }
}

fn build_service(gateway: FakeGateway) -> (ActorService, Arc<FakeGateway>, Arc<FakeConnector>) {
    let gateway = Arc::new(gateway);
    let connector = Arc::new(FakeConnector {
        gateway: gateway.clone(),
        connections: AtomicUsize::new(0),
    });

    (ActorService::new(connector.clone()), gateway, connector)
}

fn api_key() -> ApiKey {
    ApiKey::parse(Some("apify_api_test")).unwrap_or_else(|_| unreachable!())
}

fn run(status: RunStatus) -> Run {
    Run {
        id: "run-1".to_owned(),
        status,
        started_at: None,
        finished_at: None,
        stats: Some(json!({"computeUnits": 0.01})),
        default_dataset_id: Some("D1".to_owned()),
        exit_code: Some(0),
    }
}

fn input(value: Value) -> RunInput {
    RunInput::from_value(Some(value)).unwrap_or_default()
}

#[tokio::test]
async fn validate_api_key_returns_account() {
    let (service, _, _) = build_service(FakeGateway {
        user: Some(ApifyUser {
            username: "jane".to_owned(),
            email: Some("jane@example.com".to_owned()),
        }),
        ..FakeGateway::default()
    });

    let user = service.validate_api_key(&api_key()).await;
    assert!(user.is_ok());
    assert_eq!(user.unwrap_or_else(|_| unreachable!()).username, "jane");
}

#[tokio::test]
async fn validate_api_key_hides_failure_cause() {
    let (service, _, _) = build_service(FakeGateway::default());

    let result = service.validate_api_key(&api_key()).await;
    assert!(matches!(
        result,
        Err(AppError::Unauthorized(message)) if message == "Invalid API key or network error"
    ));
}

#[tokio::test]
async fn list_actors_returns_owned_actors_with_default_paging() {
    let owned = Actor {
        id: "abc".to_owned(),
        name: "my-actor".to_owned(),
        title: "My Actor".to_owned(),
        description: None,
        username: "jane".to_owned(),
        is_public: false,
        stats: ActorStats {
            total_runs: 3,
            last_run_at: None,
        },
    };
    let (service, gateway, _) = build_service(FakeGateway {
        owned_actors: Some(vec![owned.clone()]),
        ..FakeGateway::default()
    });

    let actors = service.list_actors(&api_key()).await;
    assert!(actors.is_ok());
    assert_eq!(actors.unwrap_or_default(), vec![owned]);
    assert_eq!(
        gateway.list_queries.lock().await.as_slice(),
        &[ActorListQuery {
            limit: 50,
            offset: 0,
            descending: true,
        }]
    );
}

#[tokio::test]
async fn list_actors_falls_back_for_empty_account() {
    let (service, _, _) = build_service(FakeGateway {
        owned_actors: Some(Vec::new()),
        ..FakeGateway::default()
    });

    for _ in 0..3 {
        let actors = service.list_actors(&api_key()).await.unwrap_or_default();
        let ids: Vec<&str> = actors.iter().map(|actor| actor.id.as_str()).collect();
        assert_eq!(ids, FALLBACK_ACTOR_IDS.to_vec());
    }
}

#[tokio::test]
async fn list_actors_swallows_listing_failure() {
    let (service, _, _) = build_service(FakeGateway::default());

    let actors = service.list_actors(&api_key()).await;
    assert!(actors.is_ok());
    let actors = actors.unwrap_or_default();
    assert_eq!(actors.len(), 4);
    assert!(actors.iter().any(|actor| actor.id == "apify/web-scraper"));
}

#[tokio::test]
async fn actor_schema_prefers_build_schema() {
    let (service, _, _) = build_service(FakeGateway {
        actor_detail: Some(ActorDetail {
            summary: ActorSummary::new("abc", "my-actor", None, None),
            build_input_schema: Some(json!({"title": "build", "properties": {}})),
            actor_input_schema: Some(json!({"title": "actor", "properties": {}})),
        }),
        ..FakeGateway::default()
    });

    let schema = service.actor_schema(&api_key(), "abc").await;
    assert!(schema.is_ok());
    let schema = schema.unwrap_or_else(|_| unreachable!());
    assert_eq!(schema.actor.title, "my-actor");
    assert_eq!(schema.input_schema.as_value()["title"], json!("build"));
}

#[tokio::test]
async fn actor_schema_propagates_upstream_failure() {
    let (service, _, _) = build_service(FakeGateway::default());

    let result = service.actor_schema(&api_key(), "abc").await;
    assert!(matches!(result, Err(AppError::Upstream { .. })));
}

#[tokio::test]
async fn execute_rejects_crawler_without_start_urls_before_dispatch() {
    let (service, gateway, connector) = build_service(FakeGateway {
        run: Some(run(RunStatus::Succeeded)),
        ..FakeGateway::default()
    });

    let result = service
        .execute_actor(&api_key(), "apify/website-content-crawler", input(json!({})))
        .await;

    assert!(matches!(
        result,
        Err(AppError::InvalidField { ref message, received: None })
            if message == "startUrls is required and must be a non-empty array"
    ));
    assert!(gateway.started_runs.lock().await.is_empty());
    assert_eq!(connector.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn execute_returns_dataset_items_for_succeeded_run() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Succeeded)),
        dataset_items: Some(vec![json!({"url": "https://apify.com", "title": "Apify"})]),
        ..FakeGateway::default()
    });

    let result = service
        .execute_actor(
            &api_key(),
            "apify/web-scraper",
            input(json!({"startUrls": [{"url": "https://apify.com", "method": "GET"}]})),
        )
        .await;

    assert!(result.is_ok());
    let result = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(result.status, RunStatus::Succeeded);
    assert_eq!(
        result.results,
        Some(vec![json!({"url": "https://apify.com", "title": "Apify"})])
    );
    assert_eq!(result.warning, None);
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 1);

    let started = gateway.started_runs.lock().await;
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].0, "apify/web-scraper");
    assert_eq!(started[0].2, RunOptions::default());
}

#[tokio::test]
async fn execute_turns_dataset_failure_into_warning() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Succeeded)),
        ..FakeGateway::default()
    });

    let result = service
        .execute_actor(&api_key(), "apify/hello-world", RunInput::new())
        .await;

    assert!(result.is_ok());
    let result = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(result.results, Some(Vec::new()));
    assert_eq!(result.warning.as_deref(), Some(RESULTS_PENDING_WARNING));
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn execute_warns_when_succeeded_run_has_no_dataset() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(Run {
            default_dataset_id: None,
            ..run(RunStatus::Succeeded)
        }),
        dataset_items: Some(vec![json!({"title": "never read"})]),
        ..FakeGateway::default()
    });

    let result = service
        .execute_actor(&api_key(), "apify/hello-world", RunInput::new())
        .await;

    assert!(result.is_ok());
    let result = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(result.status, RunStatus::Succeeded);
    assert_eq!(result.results, Some(Vec::new()));
    assert_eq!(result.warning.as_deref(), Some(RESULTS_PENDING_WARNING));
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn execute_reports_unfinished_runs_without_fetching_results() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Running)),
        ..FakeGateway::default()
    });

    let result = service
        .execute_actor(&api_key(), "apify/hello-world", RunInput::new())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.message.as_deref(), Some(STILL_RUNNING_MESSAGE));
    assert_eq!(result.results, None);
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 0);

    let (service, _, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Aborted)),
        ..FakeGateway::default()
    });
    let result = service
        .execute_actor(&api_key(), "apify/hello-world", RunInput::new())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(result.message.as_deref(), Some(NOT_COMPLETED_MESSAGE));
}

#[tokio::test]
async fn execute_surfaces_submission_failure() {
    let (service, _, _) = build_service(FakeGateway::default());

    let result = service
        .execute_actor(&api_key(), "apify/hello-world", RunInput::new())
        .await;
    assert!(matches!(result, Err(AppError::Upstream { .. })));
}

#[tokio::test]
async fn run_status_extracts_error_details_for_failed_run() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(Run {
            exit_code: Some(1),
            ..run(RunStatus::Failed)
        }),
        log: Some("INFO ok\nERROR timeout occurred".to_owned()),
        ..FakeGateway::default()
    });

    let result = service
        .run_status(&api_key(), "run-1")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.error_details.as_deref(), Some("ERROR timeout occurred"));
    assert_eq!(result.exit_code, Some(1));
    assert_eq!(result.results, Some(Vec::new()));
    assert_eq!(gateway.log_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn run_status_tolerates_missing_log() {
    let (service, _, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Failed)),
        ..FakeGateway::default()
    });

    let result = service.run_status(&api_key(), "run-1").await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap_or_else(|_| unreachable!()).error_details, None);
}

#[tokio::test]
async fn run_status_keeps_results_empty_when_dataset_fetch_fails() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Succeeded)),
        ..FakeGateway::default()
    });

    let result = service
        .run_status(&api_key(), "run-1")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.results, Some(Vec::new()));
    assert_eq!(result.warning, None);
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn run_status_is_repeatable_for_terminal_runs() {
    let (service, _, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Succeeded)),
        dataset_items: Some(vec![json!({"n": 1}), json!({"n": 2})]),
        ..FakeGateway::default()
    });

    let first = service.run_status(&api_key(), "run-1").await;
    let second = service.run_status(&api_key(), "run-1").await;
    assert!(first.is_ok() && second.is_ok());

    let first = first.unwrap_or_else(|_| unreachable!());
    let second = second.unwrap_or_else(|_| unreachable!());
    assert_eq!(first.status, second.status);
    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(
        serde_json::to_string(&first.results).unwrap_or_default(),
        serde_json::to_string(&second.results).unwrap_or_default()
    );
}

#[tokio::test]
async fn run_status_skips_secondary_fetch_for_running_run() {
    let (service, gateway, _) = build_service(FakeGateway {
        run: Some(run(RunStatus::Running)),
        ..FakeGateway::default()
    });

    let result = service
        .run_status(&api_key(), "run-1")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.status, RunStatus::Running);
    assert_eq!(gateway.dataset_fetches.load(Ordering::SeqCst), 0);
    assert_eq!(gateway.log_fetches.load(Ordering::SeqCst), 0);
}
