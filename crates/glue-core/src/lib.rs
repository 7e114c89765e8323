//! Glue Core - Domain types, persistence port and provider contract

pub mod error;
pub mod ids;
pub mod models;
pub mod ports;
pub mod provider;


pub use error::*;
pub use ids::*;
pub use models::*;
pub use ports::*;
pub use provider::*;
