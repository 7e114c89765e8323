//! Sign-in handlers
//!
//! Browser-facing redirect flow: `/auth/{provider}/login` sends the browser
//! to the provider, `/auth/{provider}/callback` completes the flow and opens
//! a session.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

use glue_core::{CallbackParams, GlueError};

use super::{failure, ApiFailure};
use crate::dto::{ApiResponse, ProviderSummary, SignInResponse};
use crate::state::AppState;

/// List registered providers
///
/// GET /auth/providers
pub async fn list_providers(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ProviderSummary>>> {
    let registry = state.flow.registry();
    let providers = registry
        .ids()
        .into_iter()
        .filter_map(|id| registry.provider(id).ok())
        .map(|p| ProviderSummary {
            id: p.id().to_string(),
            name: p.name().to_string(),
            provider_type: p.provider_type(),
        })
        .collect();

    Json(ApiResponse::ok(providers))
}

/// Start a sign-in
///
/// GET /auth/{provider}/login
pub async fn login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Redirect, ApiFailure> {
    let params = CallbackParams::new(query);
    let begun = state
        .flow
        .begin(&provider, &params)
        .await
        .map_err(failure)?;

    debug!("Redirecting to {} for sign-in", provider);
    Ok(Redirect::temporary(&begun.auth_url))
}

/// Finish a sign-in and open a session
///
/// GET /auth/{provider}/callback
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<SignInResponse>>, ApiFailure> {
    let user = state
        .flow
        .complete(&provider, query)
        .await
        .map_err(failure)?;

    let session = state
        .flow
        .store()
        .create_session(user.id, Utc::now() + state.session_ttl)
        .await
        .map_err(|e| failure(GlueError::from(e)))?;

    info!("Opened session for user {} via {}", user.id, provider);
    Ok(Json(ApiResponse::ok(SignInResponse::new(&user, &session))))
}
