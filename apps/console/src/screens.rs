use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use actordeck_core::{AppError, AppResult};
use actordeck_domain::{Actor, RunResult, START_URLS_FIELD, SchemaFieldType, SchemaProperty};
use chrono::Utc;
use tracing::{info, warn};

use crate::console_config::ConsoleConfig;
use crate::prompt::{self, Answer};
use crate::proxy_client::{ProxyClient, precheck_api_key};
use crate::render;
use crate::run_poller::PollEvent;
use crate::wizard::{Session, Step, Wizard, WizardState};

enum Flow {
    Continue,
    Quit,
}

enum ActorChoice {
    Actor(Box<Actor>),
    Search,
    Reload,
    Logout,
}

impl Display for ActorChoice {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Actor(actor) => formatter.write_str(&render::actor_line(actor)),
            Self::Search => formatter.write_str("🔍 Search again"),
            Self::Reload => formatter.write_str("🔄 Reload actors"),
            Self::Logout => formatter.write_str("🚪 Use a different API key"),
        }
    }
}

#[derive(Clone, Copy)]
enum ResultsAction {
    Save,
    Resume,
    Configure,
    ChooseActor,
    Logout,
    Quit,
}

impl Display for ResultsAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Save => "💾 Save results as JSON",
            Self::Resume => "🔄 Resume status polling",
            Self::Configure => "⚙️  Back to configuration",
            Self::ChooseActor => "📋 Choose another actor",
            Self::Logout => "🚪 Use a different API key",
            Self::Quit => "Quit",
        })
    }
}

/// Interactive loop driving the wizard against the proxy.
pub struct Console {
    config: ConsoleConfig,
    wizard: Wizard,
    client: Option<Arc<ProxyClient>>,
    prefilled_key: Option<String>,
    results_dir: PathBuf,
}

impl Console {
    pub fn new(config: ConsoleConfig, results_dir: PathBuf) -> Self {
        let prefilled_key = config.api_key.clone();

        Self {
            config,
            wizard: Wizard::new(),
            client: None,
            prefilled_key,
            results_dir,
        }
    }

    pub async fn run(mut self) -> AppResult<()> {
        loop {
            if let Some(banner) = self.wizard.banner() {
                eprintln!("\n❗ {banner}\n");
                self.wizard.dismiss_error();
            }

            let flow = match self.wizard.state().step() {
                Step::Auth => self.auth_screen().await?,
                Step::SelectActor => self.select_actor_screen().await?,
                Step::Configure => self.configure_screen().await?,
                Step::Results => self.results_screen().await?,
            };

            if matches!(flow, Flow::Quit) {
                println!("Bye.");
                return Ok(());
            }
        }
    }

    fn client(&self) -> AppResult<Arc<ProxyClient>> {
        self.client
            .clone()
            .ok_or_else(|| AppError::Internal("no signed-in session".to_owned()))
    }

    fn logout(&mut self) {
        self.client = None;
        self.wizard.reset();
    }

    async fn auth_screen(&mut self) -> AppResult<Flow> {
        let raw = match self.prefilled_key.take() {
            Some(raw) => raw,
            None => match prompt::api_key()? {
                Answer::Value(raw) => raw,
                Answer::Back | Answer::Quit => return Ok(Flow::Quit),
            },
        };

        let api_key = match precheck_api_key(&raw) {
            Ok(api_key) => api_key,
            Err(error) => {
                self.wizard.show_error("Sign-in failed", &error);
                return Ok(Flow::Continue);
            }
        };

        let client = Arc::new(ProxyClient::new(
            &self.config.api_base_url,
            self.config.request_timeout,
            api_key,
        )?);

        println!("Validating API key...");
        let user = match client.validate_key().await {
            Ok(user) => user,
            Err(error) => {
                warn!(error = %error, "API key validation failed");
                self.wizard.show_error("Sign-in failed", &error);
                return Ok(Flow::Continue);
            }
        };

        info!(username = %user.username, "signed in");
        println!("✅ Signed in as {}", user.username);

        self.client = Some(client);
        self.wizard.signed_in(Session {
            user,
            actors: Vec::new(),
        })?;
        self.reload_actors().await?;

        Ok(Flow::Continue)
    }

    async fn select_actor_screen(&mut self) -> AppResult<Flow> {
        let Some(session) = self.wizard.state().session() else {
            return Ok(Flow::Continue);
        };
        let actors = session.actors.clone();

        println!(
            "\n{} · {} actors available",
            session.user.username,
            actors.len()
        );
        let term = match prompt::search_term()? {
            Answer::Value(term) => term,
            Answer::Back => {
                self.logout();
                return Ok(Flow::Continue);
            }
            Answer::Quit => return Ok(Flow::Quit),
        };

        let mut options: Vec<ActorChoice> = actors
            .into_iter()
            .filter(|actor| actor.matches_search(&term))
            .map(|actor| ActorChoice::Actor(Box::new(actor)))
            .collect();
        if options.is_empty() {
            println!("No actors match \"{}\".", term.trim());
        }
        options.extend([ActorChoice::Search, ActorChoice::Reload, ActorChoice::Logout]);

        match prompt::choose("Choose an actor:", options)? {
            Answer::Value(ActorChoice::Actor(actor)) => self.open_actor(*actor).await?,
            Answer::Value(ActorChoice::Reload) => self.reload_actors().await?,
            Answer::Value(ActorChoice::Logout) => self.logout(),
            Answer::Value(ActorChoice::Search) | Answer::Back => {}
            Answer::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn reload_actors(&mut self) -> AppResult<()> {
        match self.client()?.list_actors().await {
            Ok(actors) => self.wizard.actors_reloaded(actors),
            Err(error) => {
                warn!(error = %error, "failed to load actor catalog");
                self.wizard.show_error("Failed to fetch actors", &error);
                Ok(())
            }
        }
    }

    async fn open_actor(&mut self, actor: Actor) -> AppResult<()> {
        println!("Loading input schema for {}...", actor.title);

        match self.client()?.actor_schema(&actor.id).await {
            Ok(payload) => {
                println!("\n{}", payload.actor.title);
                if let Some(description) = &payload.actor.description {
                    println!("{description}");
                }
                self.wizard
                    .actor_chosen(actor, payload.input_schema, &self.config.capability_rules)
            }
            Err(error) => {
                warn!(actor_id = %actor.id, error = %error, "failed to load actor schema");
                self.wizard.show_error("Failed to load actor schema", &error);
                Ok(())
            }
        }
    }

    async fn configure_screen(&mut self) -> AppResult<Flow> {
        let WizardState::Configure {
            selection, input, ..
        } = self.wizard.state()
        else {
            return Ok(Flow::Continue);
        };
        let (selection, input) = (selection.clone(), input.clone());

        let mut fields = selection.schema.properties();
        if selection.needs_start_urls && !fields.iter().any(|(name, _)| *name == START_URLS_FIELD)
        {
            fields.insert(0, (START_URLS_FIELD, start_urls_property()));
        }
        if fields.is_empty() {
            println!("This actor has no configurable input; it runs with defaults.");
        }

        for (name, property) in &fields {
            let required = selection.schema.is_required(name)
                || (*name == START_URLS_FIELD && selection.needs_start_urls);

            match prompt::field_value(name, property, input.get(name), required)? {
                Answer::Value(value) => self.wizard.input_edited(name, value)?,
                Answer::Back => {
                    self.wizard.back_to_actor_selection()?;
                    return Ok(Flow::Continue);
                }
                Answer::Quit => return Ok(Flow::Quit),
            }
        }

        let submission = match self.wizard.prepare_submission() {
            Ok(submission) => submission,
            Err(error) => {
                if let WizardState::Configure { errors, .. } = self.wizard.state() {
                    for (field, message) in errors {
                        eprintln!("  ✗ {field}: {message}");
                    }
                }
                self.wizard.show_error("Please fix the input", &error);
                return Ok(Flow::Continue);
            }
        };

        match prompt::confirm(&format!("Run {} now?", selection.actor.title), true)? {
            Answer::Value(true) => {}
            Answer::Value(false) => return Ok(Flow::Continue),
            Answer::Back => {
                self.wizard.back_to_actor_selection()?;
                return Ok(Flow::Continue);
            }
            Answer::Quit => return Ok(Flow::Quit),
        }

        let client = self.client()?;
        println!("⏳ Starting {}...", selection.actor.title);
        match client.execute_actor(&selection.actor.id, submission).await {
            Ok(result) => {
                info!(
                    actor_id = %selection.actor.id,
                    run_id = %result.run_id,
                    status = %result.status.as_str(),
                    "actor run started"
                );
                self.wizard
                    .run_started(result, client, self.config.poll_interval)?;
            }
            Err(error) => {
                warn!(actor_id = %selection.actor.id, error = %error, "actor execution failed");
                self.wizard.show_error("Failed to execute actor", &error);
            }
        }

        Ok(Flow::Continue)
    }

    async fn results_screen(&mut self) -> AppResult<Flow> {
        self.print_results();

        if self.wizard.is_polling() {
            println!(
                "Checking status every {}s. Press Ctrl-C to stop polling.",
                self.config.poll_interval.as_secs_f32()
            );
            self.follow_run().await;
        }

        let Some(result) = self.current_result() else {
            return Ok(Flow::Continue);
        };

        let mut actions = Vec::new();
        if !result.items().is_empty() {
            actions.push(ResultsAction::Save);
        }
        if !result.status.is_terminal() {
            actions.push(ResultsAction::Resume);
        }
        actions.extend([
            ResultsAction::Configure,
            ResultsAction::ChooseActor,
            ResultsAction::Logout,
            ResultsAction::Quit,
        ]);

        let action = match prompt::choose("What next?", actions)? {
            Answer::Value(action) => action,
            Answer::Back => ResultsAction::Configure,
            Answer::Quit => ResultsAction::Quit,
        };

        match action {
            ResultsAction::Save => match render::save_results(&self.results_dir, &result).await {
                Ok(path) => println!("💾 Saved {}", path.display()),
                Err(error) => self.wizard.show_error("Failed to save results", &error),
            },
            ResultsAction::Resume => {
                let client = self.client()?;
                self.wizard.resume_polling(client, self.config.poll_interval);
            }
            ResultsAction::Configure => self.wizard.back_to_configuration()?,
            ResultsAction::ChooseActor => self.wizard.back_to_actor_selection()?,
            ResultsAction::Logout => self.logout(),
            ResultsAction::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn follow_run(&mut self) {
        loop {
            tokio::select! {
                event = self.wizard.next_poll_event() => match event {
                    Some(PollEvent::Status(_)) => self.print_results(),
                    Some(PollEvent::Failed(_)) | None => break,
                    Some(PollEvent::Waiting) => {}
                },
                _ = tokio::signal::ctrl_c() => {
                    self.wizard.stop_polling();
                    println!("\nStopped polling.");
                    break;
                }
            }
        }
    }

    fn current_result(&self) -> Option<RunResult> {
        match self.wizard.state() {
            WizardState::Results { result, .. } => Some(result.clone()),
            _ => None,
        }
    }

    fn print_results(&self) {
        if let Some(result) = self.current_result() {
            println!("\n{}", render::run_report(&result, Utc::now()));
        }
    }
}

fn start_urls_property() -> SchemaProperty {
    SchemaProperty {
        field_type: SchemaFieldType::Array,
        default: None,
        enum_values: Vec::new(),
        title: Some("Start URLs".to_owned()),
        description: Some("Pages the actor starts crawling from".to_owned()),
        minimum: None,
        maximum: None,
    }
}
