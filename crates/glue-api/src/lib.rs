//! Glue API - HTTP endpoints for redirect-based sign-in

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;


pub use routes::create_router;
pub use state::AppState;
