//! API request handlers

pub mod auth;
pub mod health;

use axum::{http::StatusCode, Json};
use tracing::warn;

use glue_core::GlueError;

use crate::dto::ApiResponse;

pub use health::health_check;

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Stable machine-readable code for an error
pub fn error_code(err: &GlueError) -> &'static str {
    match err {
        GlueError::MissingCallbackParameter { .. } => "missing_callback_parameter",
        GlueError::TokenExchangeFailed { .. } => "token_exchange_failed",
        GlueError::ProfileFetchFailed { .. } => "profile_fetch_failed",
        GlueError::NoVerifiedPrimaryEmail => "no_verified_primary_email",
        GlueError::OrganizationNotAllowed { .. } => "organization_not_allowed",
        GlueError::NoAuthUrlConfigured => "no_auth_url_configured",
        GlueError::ProviderNotRegistered { .. } => "provider_not_registered",
        GlueError::Persistence(_) => "persistence_failure",
        GlueError::InvalidState { .. } => "invalid_state",
        GlueError::Timeout => "timeout",
        GlueError::ConfigError { .. } => "config_error",
        GlueError::Internal { .. } => "internal_error",
    }
}

pub fn error_status(err: &GlueError) -> StatusCode {
    if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_access_denied() {
        StatusCode::FORBIDDEN
    } else {
        match err {
            GlueError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GlueError::TokenExchangeFailed { .. } | GlueError::ProfileFetchFailed { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert an error into its JSON response
pub fn failure(err: GlueError) -> ApiFailure {
    let status = error_status(&err);
    if status.is_server_error() {
        warn!("Request failed: {}", err);
    }

    // Internal details stay in the logs
    let message = match &err {
        GlueError::Persistence(_) | GlueError::Internal { .. } | GlueError::ConfigError { .. } => {
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };

    (status, Json(ApiResponse::error(error_code(&err), message)))
}
