use actordeck_application::ActorService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub actor_service: ActorService,
}
