//! Provider Registry - maps provider ids to provider instances
//!
//! Providers are registered while the registry is still exclusively owned
//! (`&mut self`). Afterwards it is shared read-only behind an `Arc`, so
//! lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use glue_core::{GlueError, Provider, Result};

use crate::settings::ProvidersSettings;

#[cfg(feature = "github")]
use crate::providers::{build_http_client, github::GitHubProvider, DEFAULT_TIMEOUT};

/// Mapping from provider id to provider
pub type Providers = HashMap<String, Arc<dyn Provider>>;

/// Registry of authentication providers
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Providers,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every provider enabled in `settings`
    #[instrument(skip(settings))]
    pub fn from_settings(settings: &ProvidersSettings) -> Result<Self> {
        let mut registry = Self::new();

        #[cfg(feature = "github")]
        if let Some(github) = &settings.github {
            let http = build_http_client(DEFAULT_TIMEOUT)?;
            registry.register_provider([
                Arc::new(GitHubProvider::with_client(github.clone(), http)) as Arc<dyn Provider>
            ]);
        }

        if registry.is_empty() {
            warn!("No authentication providers configured");
        }

        registry.set_debug(settings.debug);
        Ok(registry)
    }

    /// Register providers keyed by their id. Later registrations replace
    /// earlier ones with the same id.
    pub fn register_provider<I>(&mut self, providers: I)
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        for provider in providers {
            info!(
                "Registering provider: {} ({}, {})",
                provider.name(),
                provider.id(),
                provider.provider_type()
            );

            if self
                .providers
                .insert(provider.id().to_string(), provider)
                .is_some()
            {
                debug!("Replaced previously registered provider");
            }
        }
    }

    /// All registered providers
    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Look up a provider by id
    pub fn provider(&self, id: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| GlueError::provider_not_registered(id))
    }

    /// Registered ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Toggle diagnostics on every provider
    pub fn set_debug(&self, enabled: bool) {
        for provider in self.providers.values() {
            provider.debug(enabled);
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
