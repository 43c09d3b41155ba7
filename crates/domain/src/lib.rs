//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod actor;
mod capability;
mod input_form;
mod input_schema;
mod run;
mod run_input;
mod user;

pub use actor::{Actor, ActorStats, ActorSummary, FALLBACK_ACTOR_IDS, fallback_actors};
pub use capability::ActorCapabilityRules;
pub use input_form::{FormErrors, initial_input, normalize_for_submit, validate_input};
pub use input_schema::{InputSchema, SchemaFieldType, SchemaProperty};
pub use run::{
    LOG_TAIL_LINES, NOT_COMPLETED_MESSAGE, RESULTS_PENDING_WARNING, Run, RunResult, RunStatus,
    STILL_RUNNING_MESSAGE, extract_error_details,
};
pub use run_input::{PLACEHOLDER_START_URL, RunInput, START_URLS_FIELD, StartUrl};
pub use user::ApifyUser;
