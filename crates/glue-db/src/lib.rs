//! Storage adapters for Glue auth
//!
//! Database wiring lives outside this workspace; the in-memory adapter here
//! implements the full persistence port and backs tests and the demo server.

pub mod memory;

pub use memory::{generate_token, MemoryAuthStore};
