mod handlers;

pub use handlers::{
    actor_schema_handler, execute_actor_handler, list_actors_handler, run_status_handler,
    validate_key_handler,
};
