//! Authentication provider contract
//!
//! Every identity source (OAuth2, OIDC, SAML, email, WebAuthn) implements
//! [`Provider`], so callers only ever see these types:
//! - [`AuthIntent`]: result of starting a flow (redirect URL + PKCE verifier)
//! - [`AuthParams`]: callback payload handed back when completing a flow

use crate::{
    error::{GlueError, Result},
    models::User,
    ports::AuthStore,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Provider Types
// =============================================================================

/// Flow shape a provider implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OAuth2,
    Oidc,
    Saml,
    Email,
    WebAuthn,
    Unknown,
}

impl ProviderType {
    /// Redirect-based flows send the browser to the provider and back
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::OAuth2 | Self::Oidc | Self::Saml)
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OAuth2 => write!(f, "oauth2"),
            Self::Oidc => write!(f, "oidc"),
            Self::Saml => write!(f, "saml"),
            Self::Email => write!(f, "email"),
            Self::WebAuthn => write!(f, "webauthn"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "oauth2" => Self::OAuth2,
            "oidc" => Self::Oidc,
            "saml" => Self::Saml,
            "email" => Self::Email,
            "webauthn" => Self::WebAuthn,
            _ => Self::Unknown,
        })
    }
}

// =============================================================================
// Flow Values
// =============================================================================

/// Callback payload of a flow
pub trait AuthParams: Send + Sync {
    /// Named parameter, e.g. the authorization `code` or a raw SAML response
    fn get(&self, name: &str) -> Option<String>;

    /// PKCE verifier produced by the matching `begin_auth`, if any
    fn code_verifier(&self) -> Option<String>;
}

/// Map-backed [`AuthParams`]
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    values: HashMap<String, String>,
    code_verifier: Option<String>,
}

impl CallbackParams {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            code_verifier: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_code_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }
}

impl AuthParams for CallbackParams {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn code_verifier(&self) -> Option<String> {
        self.code_verifier.clone().filter(|v| !v.is_empty())
    }
}

/// Result of starting a flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthIntent {
    auth_url: Option<String>,
    code_verifier: Option<String>,
}

impl AuthIntent {
    pub fn new(auth_url: impl Into<String>, code_verifier: Option<String>) -> Self {
        Self {
            auth_url: Some(auth_url.into()),
            code_verifier,
        }
    }

    /// URL of the provider's authentication endpoint
    pub fn get_auth_url(&self) -> Result<&str> {
        self.auth_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(GlueError::NoAuthUrlConfigured)
    }

    pub fn code_verifier(&self) -> Option<&str> {
        self.code_verifier.as_deref()
    }
}

// =============================================================================
// Provider Contract
// =============================================================================

/// Pluggable identity provider
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, used as registry key and `Account::provider`
    fn id(&self) -> &str;

    /// Human-readable label
    fn name(&self) -> &str;

    fn provider_type(&self) -> ProviderType;

    /// Toggle verbose diagnostics
    fn debug(&self, enabled: bool);

    /// Start a flow. `state` must round-trip through the provider redirect.
    async fn begin_auth(
        &self,
        store: &dyn AuthStore,
        state: &str,
        params: &dyn AuthParams,
    ) -> Result<AuthIntent>;

    /// Finish a flow and return the reconciled user
    async fn complete_auth(&self, store: &dyn AuthStore, params: &dyn AuthParams) -> Result<User>;
}
