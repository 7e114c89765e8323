//! API route definitions

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes())
        .with_state(state)
}

/// Sign-in routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/providers", get(handlers::auth::list_providers))
        .route("/{provider}/login", get(handlers::auth::login))
        .route("/{provider}/callback", get(handlers::auth::callback))
}
