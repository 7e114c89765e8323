//! Authentication provider implementations

#[cfg(feature = "github")]
pub mod github;

mod common;

pub use common::*;
