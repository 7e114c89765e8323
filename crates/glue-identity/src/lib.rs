//! Glue Identity - Pluggable authentication providers
//!
//! This crate provides:
//! - `ProviderRegistry`: id → provider mapping built once at startup
//! - `AuthFlow`: begin/complete orchestration with server-side PKCE state
//! - Provider implementations (GitHub, optionally GitHub Enterprise)
//!
//! Providers implement [`glue_core::Provider`] and reconcile users through
//! a [`glue_core::AuthStore`].

pub mod flow;
pub mod providers;
pub mod registry;
pub mod settings;


#[cfg(feature = "github")]
pub use providers::github::{GitHubApi, GitHubEndpoints, GitHubProvider, RestGitHubApi};

pub use flow::{AuthFlow, BeginOutcome, MemoryPendingAuthStore, PendingAuth, PendingAuthStore};
pub use registry::{ProviderRegistry, Providers};
pub use settings::{GitHubSettings, ProvidersSettings};
