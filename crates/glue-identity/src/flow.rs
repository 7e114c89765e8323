//! Sign-in flow orchestration
//!
//! [`AuthFlow`] ties the two halves of a redirect flow together. `begin`
//! generates the state, asks the provider for an [`AuthIntent`] and parks
//! the PKCE verifier under that state. `complete` consumes the parked record
//! exactly once and hands the verifier back to the provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use glue_core::{AuthParams, AuthStore, CallbackParams, GlueError, Result, User};

use crate::providers::generate_state;
use crate::registry::ProviderRegistry;

/// Lifetime of a started but not yet completed flow
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(600);

/// Upper bound for a single completion
pub const DEFAULT_COMPLETE_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_PENDING_FLOWS: u64 = 100_000;

// =============================================================================
// Pending Flows
// =============================================================================

/// Server-side half of a started flow, keyed by its state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuth {
    pub provider_id: String,
    pub code_verifier: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage for pending flows
#[async_trait]
pub trait PendingAuthStore: Send + Sync {
    async fn put(&self, state: &str, pending: PendingAuth) -> Result<()>;

    /// Remove and return the record; a second call for the same state
    /// returns `None`
    async fn take(&self, state: &str) -> Result<Option<PendingAuth>>;
}

/// In-memory [`PendingAuthStore`] with time-based expiry
#[derive(Clone)]
pub struct MemoryPendingAuthStore {
    cache: Cache<String, PendingAuth>,
}

impl MemoryPendingAuthStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_PENDING_FLOWS)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl Default for MemoryPendingAuthStore {
    fn default() -> Self {
        Self::new(DEFAULT_PENDING_TTL)
    }
}

#[async_trait]
impl PendingAuthStore for MemoryPendingAuthStore {
    async fn put(&self, state: &str, pending: PendingAuth) -> Result<()> {
        self.cache.insert(state.to_string(), pending).await;
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<PendingAuth>> {
        Ok(self.cache.remove(state).await)
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Result of starting a flow
#[derive(Debug, Clone)]
pub struct BeginOutcome {
    /// Where to send the browser
    pub auth_url: String,
    pub state: String,
}

/// Begin/complete orchestration over a [`ProviderRegistry`]
#[derive(Clone)]
pub struct AuthFlow {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn AuthStore>,
    pending: Arc<dyn PendingAuthStore>,
    complete_timeout: Duration,
}

impl AuthFlow {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn AuthStore>,
        pending: Arc<dyn PendingAuthStore>,
    ) -> Self {
        Self {
            registry,
            store,
            pending,
            complete_timeout: DEFAULT_COMPLETE_TIMEOUT,
        }
    }

    pub fn with_complete_timeout(mut self, timeout: Duration) -> Self {
        self.complete_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    /// Start a flow with `provider_id`
    #[instrument(skip(self, params))]
    pub async fn begin(&self, provider_id: &str, params: &dyn AuthParams) -> Result<BeginOutcome> {
        let provider = self.registry.provider(provider_id)?;
        let state = generate_state();

        let intent = provider
            .begin_auth(self.store.as_ref(), &state, params)
            .await?;
        let auth_url = intent.get_auth_url()?.to_string();

        self.pending
            .put(
                &state,
                PendingAuth {
                    provider_id: provider.id().to_string(),
                    code_verifier: intent.code_verifier().map(str::to_string),
                    created_at: Utc::now(),
                },
            )
            .await?;

        debug!("Started {} flow", provider.id());
        Ok(BeginOutcome { auth_url, state })
    }

    /// Finish a flow from the callback query parameters. The `state`
    /// parameter must name a pending flow started for the same provider.
    #[instrument(skip(self, callback))]
    pub async fn complete(
        &self,
        provider_id: &str,
        callback: HashMap<String, String>,
    ) -> Result<User> {
        let provider = self.registry.provider(provider_id)?;

        let state = callback
            .get("state")
            .filter(|s| !s.is_empty())
            .cloned()
            .ok_or_else(|| GlueError::missing_parameter("state"))?;

        let pending = self
            .pending
            .take(&state)
            .await?
            .ok_or_else(|| GlueError::invalid_state("Unknown or expired state"))?;

        if pending.provider_id != provider.id() {
            warn!(
                "State issued for {} presented to {}",
                pending.provider_id,
                provider.id()
            );
            return Err(GlueError::invalid_state(
                "State was issued for a different provider",
            ));
        }

        let mut params = CallbackParams::new(callback);
        if let Some(verifier) = pending.code_verifier {
            params = params.with_code_verifier(verifier);
        }

        let user = tokio::time::timeout(
            self.complete_timeout,
            provider.complete_auth(self.store.as_ref(), &params),
        )
        .await
        .map_err(|_| {
            warn!(
                "Completing {} flow exceeded {:?}",
                provider.id(),
                self.complete_timeout
            );
            GlueError::Timeout
        })??;

        info!("Completed {} flow for user {}", provider.id(), user.id);
        Ok(user)
    }
}
