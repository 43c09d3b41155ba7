use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actordeck_core::{AppError, AppResult};
use actordeck_domain::{
    ActorCapabilityRules, ApifyUser, InputSchema, RunResult, RunStatus, fallback_actors,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{Session, Wizard, WizardState};
use crate::run_poller::{PollEvent, RunStatusSource};

const PERIOD: Duration = Duration::from_secs(3);

struct SucceedingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl RunStatusSource for SucceedingSource {
    async fn run_status(&self, run_id: &str) -> AppResult<RunResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut result = run_result(run_id, RunStatus::Succeeded);
        result.results = Some(vec![json!({"title": "Example"})]);
        Ok(result)
    }
}

fn source() -> Arc<SucceedingSource> {
    Arc::new(SucceedingSource {
        calls: AtomicUsize::new(0),
    })
}

fn run_result(run_id: &str, status: RunStatus) -> RunResult {
    RunResult {
        run_id: run_id.to_owned(),
        status,
        started_at: None,
        finished_at: None,
        stats: None,
        results: None,
        error_details: None,
        warning: None,
        message: None,
        exit_code: None,
    }
}

fn session() -> Session {
    Session {
        user: ApifyUser {
            username: "jane".to_owned(),
            email: None,
        },
        actors: fallback_actors(Utc::now()),
    }
}

fn crawler_schema() -> InputSchema {
    InputSchema::from_value(json!({
        "properties": {
            "startUrls": {"type": "array"},
            "maxPages": {"type": "integer", "default": 10},
            "proxy": {"type": "object"}
        },
        "required": ["startUrls", "maxPages"]
    }))
}

fn configured_wizard() -> Wizard {
    let mut wizard = Wizard::new();
    assert!(wizard.signed_in(session()).is_ok());

    let actor = fallback_actors(Utc::now()).remove(1);
    let chosen = wizard.actor_chosen(actor, crawler_schema(), &ActorCapabilityRules::default());
    assert!(chosen.is_ok());
    wizard
}

#[test]
fn happy_path_walks_all_steps() {
    let mut state = WizardState::Auth;
    assert!(state.signed_in(session()).is_ok());
    assert_eq!(state.name(), "selectActor");

    let actor = fallback_actors(Utc::now()).remove(0);
    let chosen = state.actor_chosen(actor, InputSchema::empty(), &ActorCapabilityRules::default());
    assert!(chosen.is_ok());
    assert_eq!(state.name(), "configure");

    assert!(state.run_started(run_result("run-1", RunStatus::Succeeded)).is_ok());
    assert_eq!(state.name(), "results");
}

#[test]
fn illegal_transitions_leave_state_unchanged() {
    let mut state = WizardState::Auth;

    let result = state.back_to_configuration();
    assert!(matches!(result, Err(AppError::Validation(message)) if message == "cannot go back to configuration from the auth step"));
    assert_eq!(state, WizardState::Auth);

    assert!(state.signed_in(session()).is_ok());
    let before = state.clone();
    assert!(state.signed_in(session()).is_err());
    assert!(state.run_started(run_result("run-1", RunStatus::Running)).is_err());
    assert!(state.back_to_actor_selection().is_err());
    assert_eq!(state, before);
}

#[test]
fn configure_starts_from_schema_defaults_with_placeholder_url() {
    let wizard = configured_wizard();

    let WizardState::Configure {
        selection, input, ..
    } = wizard.state()
    else {
        unreachable!();
    };
    assert!(selection.needs_start_urls);
    assert_eq!(
        input.clone().into_value(),
        json!({
            "startUrls": [{"url": "https://example.com", "method": "GET"}],
            "maxPages": 10,
            "proxy": {}
        })
    );
}

#[test]
fn submission_is_blocked_until_required_fields_are_filled() {
    let mut wizard = configured_wizard();
    assert!(wizard.input_edited("startUrls", json!([])).is_ok());

    let result = wizard.prepare_submission();
    assert!(matches!(
        result,
        Err(AppError::InvalidField { ref message, .. }) if message == "startUrls: Start URLs are required"
    ));
    let WizardState::Configure { errors, .. } = wizard.state() else {
        unreachable!();
    };
    assert!(errors.contains_key("startUrls"));

    assert!(
        wizard
            .input_edited("startUrls", json!(["https://a.example", " "]))
            .is_ok()
    );
    let input = wizard.prepare_submission();
    assert!(input.is_ok());
    assert_eq!(
        input.unwrap_or_else(|_| unreachable!()).into_value()["startUrls"],
        json!([{"url": "https://a.example", "method": "GET"}])
    );
}

#[test]
fn back_transitions_keep_session_and_input() {
    let mut wizard = configured_wizard();
    assert!(wizard.input_edited("maxPages", json!(3)).is_ok());
    assert!(
        wizard
            .run_started(
                run_result("run-1", RunStatus::Failed),
                source(),
                PERIOD
            )
            .is_ok()
    );

    assert!(wizard.back_to_configuration().is_ok());
    let WizardState::Configure { input, .. } = wizard.state() else {
        unreachable!();
    };
    assert_eq!(input.get("maxPages"), Some(&json!(3)));

    assert!(wizard.back_to_actor_selection().is_ok());
    assert_eq!(wizard.state().name(), "selectActor");
    assert_eq!(
        wizard.state().session().map(|session| session.user.username.as_str()),
        Some("jane")
    );

    wizard.reset();
    assert_eq!(wizard.state(), &WizardState::Auth);
}

#[test]
fn banner_is_set_dismissed_and_cleared_by_transitions() {
    let mut wizard = configured_wizard();

    wizard.show_error(
        "Failed to load actor schema",
        &AppError::Upstream {
            status: Some(500),
            message: "Failed to fetch actor schema".to_owned(),
            details: json!({"message": "Actor not found"}),
        },
    );
    assert_eq!(
        wizard.banner(),
        Some("Failed to load actor schema: Failed to fetch actor schema (Actor not found)")
    );

    wizard.dismiss_error();
    assert_eq!(wizard.banner(), None);

    wizard.show_error("Failed", &AppError::Unauthorized("nope".to_owned()));
    assert!(wizard.back_to_actor_selection().is_ok());
    assert_eq!(wizard.banner(), None);
}

#[tokio::test]
async fn terminal_run_starts_no_poller() {
    let mut wizard = configured_wizard();
    let source = source();

    let started = wizard.run_started(run_result("run-1", RunStatus::Succeeded), source.clone(), PERIOD);
    assert!(started.is_ok());
    assert!(!wizard.is_polling());
    assert_eq!(wizard.next_poll_event().await, None);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn running_run_is_polled_until_it_succeeds() {
    let mut wizard = configured_wizard();
    let source = source();

    let started = wizard.run_started(run_result("run-1", RunStatus::Running), source.clone(), PERIOD);
    assert!(started.is_ok());
    assert!(wizard.is_polling());

    let event = wizard.next_poll_event().await;
    assert!(matches!(event, Some(PollEvent::Status(ref result)) if result.status == RunStatus::Succeeded));
    assert_eq!(wizard.next_poll_event().await, None);
    assert!(!wizard.is_polling());

    let WizardState::Results { result, .. } = wizard.state() else {
        unreachable!();
    };
    assert_eq!(result.status, RunStatus::Succeeded);
    assert_eq!(result.items(), &[json!({"title": "Example"})]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn leaving_results_cancels_polling() {
    let mut wizard = configured_wizard();
    let source = source();

    let started = wizard.run_started(run_result("run-1", RunStatus::Running), source.clone(), PERIOD);
    assert!(started.is_ok());
    assert!(wizard.back_to_configuration().is_ok());
    assert!(!wizard.is_polling());

    tokio::time::sleep(PERIOD * 5).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn stopped_polling_can_be_resumed_while_run_is_open() {
    let mut wizard = configured_wizard();
    let source = source();

    let started = wizard.run_started(run_result("run-1", RunStatus::Running), source.clone(), PERIOD);
    assert!(started.is_ok());
    wizard.stop_polling();
    assert!(!wizard.is_polling());

    assert!(wizard.resume_polling(source.clone(), PERIOD));
    assert!(!wizard.resume_polling(source.clone(), PERIOD));
    assert!(wizard.next_poll_event().await.is_some());
    assert_eq!(wizard.next_poll_event().await, None);

    assert!(!wizard.resume_polling(source.clone(), PERIOD));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn catalog_reload_only_applies_on_actor_selection() {
    let mut state = WizardState::Auth;
    assert!(state.actors_reloaded(Vec::new()).is_err());

    assert!(state.signed_in(session()).is_ok());
    assert!(state.actors_reloaded(Vec::new()).is_ok());
    assert_eq!(state.session().map(|session| session.actors.len()), Some(0));
}
