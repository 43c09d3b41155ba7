mod handlers;

pub use handlers::health_handler;
