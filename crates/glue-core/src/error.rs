//! Error types for the Glue auth platform

use thiserror::Error;

/// Errors surfaced by a persistence adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum GlueError {
    #[error("Missing callback parameter: {name}")]
    MissingCallbackParameter { name: String },

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },

    #[error("Failed to fetch user profile: {message}")]
    ProfileFetchFailed { message: String },

    #[error("No verified primary email found")]
    NoVerifiedPrimaryEmail,

    #[error("User {login} is not in an allowed organization")]
    OrganizationNotAllowed { login: String },

    #[error("An auth URL has not been set")]
    NoAuthUrlConfigured,

    #[error("No provider for {id} exists")]
    ProviderNotRegistered { id: String },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("Invalid auth state: {message}")]
    InvalidState { message: String },

    #[error("Authentication timed out")]
    Timeout,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GlueError {
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingCallbackParameter { name: name.into() }
    }

    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::TokenExchangeFailed {
            message: message.into(),
        }
    }

    pub fn profile_fetch(message: impl Into<String>) -> Self {
        Self::ProfileFetchFailed {
            message: message.into(),
        }
    }

    pub fn provider_not_registered(id: impl Into<String>) -> Self {
        Self::ProviderNotRegistered { id: id.into() }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by a
    /// downstream system (network, identity provider, storage).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCallbackParameter { .. }
                | Self::ProviderNotRegistered { .. }
                | Self::InvalidState { .. }
        )
    }

    /// True for policy denials of an otherwise well-formed sign-in.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Self::NoVerifiedPrimaryEmail | Self::OrganizationNotAllowed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GlueError>;

/// Result type returned by persistence adapters.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
