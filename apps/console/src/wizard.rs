use std::mem;
use std::sync::Arc;
use std::time::Duration;

use actordeck_core::{AppError, AppResult};
use actordeck_domain::{
    Actor, ActorCapabilityRules, ApifyUser, FormErrors, InputSchema, RunInput, RunResult,
    initial_input, normalize_for_submit, validate_input,
};

use crate::proxy_client::describe_error;
use crate::run_poller::{PollEvent, RunPoller, RunStatusSource};

/// Signed-in user and the catalog shown to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: ApifyUser,
    pub actors: Vec<Actor>,
}

/// Actor picked for configuration, with its input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub actor: Actor,
    pub schema: InputSchema,
    pub needs_start_urls: bool,
}

/// Wizard step without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Auth,
    SelectActor,
    Configure,
    Results,
}

/// Step the wizard is on, carrying everything that step needs.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    Auth,
    SelectActor {
        session: Session,
    },
    Configure {
        session: Session,
        selection: Selection,
        input: RunInput,
        errors: FormErrors,
    },
    Results {
        session: Session,
        selection: Selection,
        input: RunInput,
        result: RunResult,
    },
}

impl WizardState {
    pub fn step(&self) -> Step {
        match self {
            Self::Auth => Step::Auth,
            Self::SelectActor { .. } => Step::SelectActor,
            Self::Configure { .. } => Step::Configure,
            Self::Results { .. } => Step::Results,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.step() {
            Step::Auth => "auth",
            Step::SelectActor => "selectActor",
            Step::Configure => "configure",
            Step::Results => "results",
        }
    }

    /// Applies `step`; a rejected step leaves the state untouched.
    fn transition<F>(&mut self, action: &str, step: F) -> AppResult<()>
    where
        F: FnOnce(Self) -> Result<Self, Self>,
    {
        let current = mem::replace(self, Self::Auth);
        match step(current) {
            Ok(next) => {
                *self = next;
                Ok(())
            }
            Err(unchanged) => {
                let error = AppError::Validation(format!(
                    "cannot {action} from the {} step",
                    unchanged.name()
                ));
                *self = unchanged;
                Err(error)
            }
        }
    }

    pub fn signed_in(&mut self, session: Session) -> AppResult<()> {
        self.transition("sign in", |state| match state {
            Self::Auth => Ok(Self::SelectActor { session }),
            other => Err(other),
        })
    }

    pub fn actors_reloaded(&mut self, actors: Vec<Actor>) -> AppResult<()> {
        match self {
            Self::SelectActor { session } => {
                session.actors = actors;
                Ok(())
            }
            other => Err(AppError::Validation(format!(
                "cannot reload actors from the {} step",
                other.name()
            ))),
        }
    }

    /// Opens the input form for `actor`, prefilled from its schema.
    pub fn actor_chosen(
        &mut self,
        actor: Actor,
        schema: InputSchema,
        rules: &ActorCapabilityRules,
    ) -> AppResult<()> {
        self.transition("choose an actor", |state| match state {
            Self::SelectActor { session } => {
                let needs_start_urls = rules.requires_start_urls(&actor.id, Some(&actor.name));
                let input = initial_input(&schema, needs_start_urls);
                Ok(Self::Configure {
                    session,
                    selection: Selection {
                        actor,
                        schema,
                        needs_start_urls,
                    },
                    input,
                    errors: FormErrors::new(),
                })
            }
            other => Err(other),
        })
    }

    pub fn input_edited(&mut self, field: &str, value: serde_json::Value) -> AppResult<()> {
        match self {
            Self::Configure { input, errors, .. } => {
                input.insert(field, value);
                errors.remove(field);
                Ok(())
            }
            other => Err(AppError::Validation(format!(
                "cannot edit input from the {} step",
                other.name()
            ))),
        }
    }

    /// Validates the form and returns the normalized input ready to submit.
    ///
    /// On failure the field errors are stored on the form and returned.
    pub fn prepare_submission(&mut self) -> AppResult<RunInput> {
        let step = self.name();
        let Self::Configure {
            selection,
            input,
            errors,
            ..
        } = self
        else {
            return Err(AppError::Validation(format!(
                "cannot submit from the {step} step"
            )));
        };

        *errors = validate_input(&selection.schema, input, selection.needs_start_urls);
        if let Some((field, message)) = errors.iter().next() {
            return Err(AppError::InvalidField {
                message: format!("{field}: {message}"),
                received: input.get(field).cloned(),
            });
        }

        Ok(normalize_for_submit(input.clone()))
    }

    pub fn run_started(&mut self, result: RunResult) -> AppResult<()> {
        self.transition("show results", |state| match state {
            Self::Configure {
                session,
                selection,
                input,
                ..
            } => Ok(Self::Results {
                session,
                selection,
                input,
                result,
            }),
            other => Err(other),
        })
    }

    /// Replaces the shown run with a newer observation of the same run.
    pub fn result_refreshed(&mut self, latest: RunResult) -> AppResult<()> {
        match self {
            Self::Results { result, .. } if result.run_id == latest.run_id => {
                *result = latest;
                Ok(())
            }
            Self::Results { .. } => Err(AppError::Validation(
                "status update belongs to another run".to_owned(),
            )),
            other => Err(AppError::Validation(format!(
                "cannot refresh results from the {} step",
                other.name()
            ))),
        }
    }

    pub fn back_to_actor_selection(&mut self) -> AppResult<()> {
        self.transition("go back to actor selection", |state| match state {
            Self::Configure { session, .. } | Self::Results { session, .. } => {
                Ok(Self::SelectActor { session })
            }
            other => Err(other),
        })
    }

    /// Returns to the form with the values that were submitted.
    pub fn back_to_configuration(&mut self) -> AppResult<()> {
        self.transition("go back to configuration", |state| match state {
            Self::Results {
                session,
                selection,
                input,
                ..
            } => Ok(Self::Configure {
                session,
                selection,
                input,
                errors: FormErrors::new(),
            }),
            other => Err(other),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::Auth;
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Auth => None,
            Self::SelectActor { session }
            | Self::Configure { session, .. }
            | Self::Results { session, .. } => Some(session),
        }
    }
}

/// Wizard state plus the global error banner and the results poller.
///
/// The poller only lives while the wizard shows results; any transition
/// away from that step drops it, which cancels the polling task.
pub struct Wizard {
    state: WizardState,
    banner: Option<String>,
    poller: Option<RunPoller>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: WizardState::Auth,
            banner: None,
            poller: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn show_error(&mut self, context: &str, error: &AppError) {
        self.banner = Some(format!("{context}: {}", describe_error(error)));
    }

    pub fn dismiss_error(&mut self) {
        self.banner = None;
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    pub fn signed_in(&mut self, session: Session) -> AppResult<()> {
        self.apply(|state| state.signed_in(session))
    }

    pub fn actors_reloaded(&mut self, actors: Vec<Actor>) -> AppResult<()> {
        self.apply(|state| state.actors_reloaded(actors))
    }

    pub fn actor_chosen(
        &mut self,
        actor: Actor,
        schema: InputSchema,
        rules: &ActorCapabilityRules,
    ) -> AppResult<()> {
        self.apply(|state| state.actor_chosen(actor, schema, rules))
    }

    pub fn input_edited(&mut self, field: &str, value: serde_json::Value) -> AppResult<()> {
        self.state.input_edited(field, value)
    }

    pub fn prepare_submission(&mut self) -> AppResult<RunInput> {
        self.state.prepare_submission()
    }

    /// Shows `result` and starts polling it when the run is still going.
    pub fn run_started(
        &mut self,
        result: RunResult,
        source: Arc<dyn RunStatusSource>,
        period: Duration,
    ) -> AppResult<()> {
        let poll = (!result.status.is_terminal()).then(|| result.run_id.clone());
        self.apply(|state| state.run_started(result))?;

        if let Some(run_id) = poll {
            self.poller = Some(RunPoller::start(source, run_id, period));
        }

        Ok(())
    }

    /// Restarts polling of the shown run if it has not settled yet.
    pub fn resume_polling(&mut self, source: Arc<dyn RunStatusSource>, period: Duration) -> bool {
        match &self.state {
            WizardState::Results { result, .. }
                if !result.status.is_terminal() && self.poller.is_none() =>
            {
                self.poller = Some(RunPoller::start(source, result.run_id.clone(), period));
                true
            }
            _ => false,
        }
    }

    /// Waits for the poller's next observation and applies it.
    ///
    /// Returns `None` when nothing is being polled or polling has stopped.
    pub async fn next_poll_event(&mut self) -> Option<PollEvent> {
        let event = self.poller.as_mut()?.changed().await;

        match &event {
            Some(PollEvent::Status(result)) => {
                if let Err(error) = self.state.result_refreshed(result.clone()) {
                    self.show_error("Failed to check run status", &error);
                }
            }
            Some(PollEvent::Failed(message)) => {
                self.banner = Some(format!("Failed to check run status: {message}"));
            }
            Some(PollEvent::Waiting) => {}
            None => self.poller = None,
        }

        event
    }

    pub fn stop_polling(&mut self) {
        self.poller = None;
    }

    pub fn back_to_actor_selection(&mut self) -> AppResult<()> {
        self.apply(WizardState::back_to_actor_selection)
    }

    pub fn back_to_configuration(&mut self) -> AppResult<()> {
        self.apply(WizardState::back_to_configuration)
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.banner = None;
        self.poller = None;
    }

    fn apply<F>(&mut self, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut WizardState) -> AppResult<()>,
    {
        change(&mut self.state)?;
        self.banner = None;
        if !matches!(self.state, WizardState::Results { .. }) {
            self.poller = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
