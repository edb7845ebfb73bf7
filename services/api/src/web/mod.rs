pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

pub use middleware::require_identity;
pub use rest::{create_todo_handler, get_todo_handler, health_handler, list_todos_handler};

/// Builds the application router. Shared between the server binary and the
/// integration tests.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no identity required)
    let public_routes = Router::new().route("/health", get(health_handler));

    // Protected routes (forwarded identity required)
    let protected_routes = Router::new()
        .route("/todos", post(create_todo_handler).get(list_todos_handler))
        .route("/todos/{id}", get(get_todo_handler))
        .layer(axum_middleware::from_fn(require_identity));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
