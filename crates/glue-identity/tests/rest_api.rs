//! `RestGitHubApi` against a local HTTP server standing in for GitHub
//!
//! The server answers the token endpoint at the root and the REST API both
//! at the root (github.com layout) and under `/api/v3` (Enterprise layout).
//! The two REST trees report different logins so tests can tell which one
//! was hit.

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use glue_core::GlueError;
use glue_identity::providers::{build_http_client, PaginatedRequest};
use glue_identity::{GitHubApi, GitHubEndpoints, GitHubSettings, RestGitHubApi};

const ACCESS_TOKEN: &str = "gho_local";
const VERIFIER: &str = "verifier-1";

// =============================================================================
// Local GitHub
// =============================================================================

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();

    match field("code") {
        "unavailable" => (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response(),
        "expired" => Json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }))
        .into_response(),
        _ if field("client_secret") != "secret-456"
            || field("code_verifier") != VERIFIER
            || field("grant_type") != "authorization_code" =>
        {
            Json(json!({ "error": "incorrect_client_credentials" })).into_response()
        }
        _ => Json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "bearer",
            "scope": "user:email",
            "state": "opaque"
        }))
        .into_response(),
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h == format!("Bearer {}", ACCESS_TOKEN))
}

async fn emails(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    match query.get("page").map(String::as_str) {
        Some("2") => Json(json!([
            { "email": "octocat@github.com", "primary": true, "verified": true }
        ]))
        .into_response(),
        _ => {
            let link = format!(
                "<http://{host}/user/emails?page=2>; rel=\"next\", <http://{host}/user/emails?page=2>; rel=\"last\""
            );
            (
                [(header::LINK, link)],
                Json(json!([
                    { "email": "octo@users.noreply.github.com", "primary": false, "verified": true }
                ])),
            )
                .into_response()
        }
    }
}

async fn membership(Path((org, login)): Path<(String, String)>) -> Response {
    match org.as_str() {
        "yes" => StatusCode::NO_CONTENT.into_response(),
        "no" => StatusCode::NOT_FOUND.into_response(),
        // Followed, this would land on a 204
        "redir" => (
            StatusCode::FOUND,
            [(header::LOCATION, format!("/orgs/{}/public_members/{}", org, login))],
        )
            .into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn rest_routes(login: &'static str) -> Router {
    Router::new()
        .route(
            "/user",
            get(move |headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                Json(json!({ "id": 583231, "login": login, "name": "The Octocat" }))
                    .into_response()
            }),
        )
        .route("/user/emails", get(emails))
        .route("/orgs/{org}/members/{login}", get(membership))
        .route(
            "/orgs/{org}/public_members/{login}",
            get(|| async { StatusCode::NO_CONTENT }),
        )
}

/// Start the server and return its base URL
async fn serve() -> String {
    let app = Router::new()
        .route("/login/oauth/access_token", post(token))
        .merge(rest_routes("octocat"))
        .nest("/api/v3", rest_routes("ghe-octocat"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn settings() -> GitHubSettings {
    GitHubSettings::new(
        "client-123",
        "secret-456",
        "https://app.example.com/auth/github/callback",
    )
}

/// Client for the github.com layout of the local server
fn api(base: &str) -> RestGitHubApi {
    let endpoints = GitHubEndpoints {
        token_url: format!("{}/login/oauth/access_token", base),
        api_url: base.to_string(),
        ..GitHubEndpoints::github()
    };
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    RestGitHubApi::new(http, &settings(), endpoints)
}

// =============================================================================
// Token Exchange
// =============================================================================

#[tokio::test]
async fn test_exchange_code_reads_scope_and_extra_fields() {
    let api = api(&serve().await);

    let token = api.exchange_code("code-1", VERIFIER).await.unwrap();
    assert_eq!(token.access_token, ACCESS_TOKEN);
    assert_eq!(token.scope.as_deref(), Some("user:email"));
    assert_eq!(token.granted_scopes(), Some(vec!["user:email"]));
    assert_eq!(token.extra_str("state"), Some("opaque"));
}

#[tokio::test]
async fn test_exchange_code_failures() {
    let api = api(&serve().await);

    // OAuth error in a 200 body
    match api.exchange_code("expired", VERIFIER).await {
        Err(GlueError::TokenExchangeFailed { message }) => {
            assert!(message.contains("bad_verification_code"));
        }
        other => panic!("unexpected result: {:?}", other.map(|t| t.access_token)),
    }

    // Non-2xx status
    match api.exchange_code("unavailable", VERIFIER).await {
        Err(GlueError::TokenExchangeFailed { message }) => assert!(message.contains("503")),
        other => panic!("unexpected result: {:?}", other.map(|t| t.access_token)),
    }

    // Wrong verifier
    assert!(matches!(
        api.exchange_code("code-1", "some-other-verifier").await,
        Err(GlueError::TokenExchangeFailed { .. })
    ));
}

// =============================================================================
// REST Calls
// =============================================================================

#[tokio::test]
async fn test_authenticated_user() {
    let api = api(&serve().await);

    let user = api.authenticated_user(ACCESS_TOKEN).await.unwrap();
    assert_eq!(user.id, 583231);
    assert_eq!(user.login, "octocat");

    assert!(matches!(
        api.authenticated_user("wrong-token").await,
        Err(GlueError::ProfileFetchFailed { .. })
    ));
}

#[tokio::test]
async fn test_list_emails_follows_link_header() {
    let api = api(&serve().await);

    let first = api
        .list_emails(ACCESS_TOKEN, PaginatedRequest::default())
        .await
        .unwrap();
    assert_eq!(first.items.len(), 1);
    assert!(!first.items[0].primary);
    assert_eq!(first.next_page, Some(2));

    let last = api
        .list_emails(
            ACCESS_TOKEN,
            PaginatedRequest {
                page: 2,
                page_size: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(last.items[0].email, "octocat@github.com");
    assert!(last.items[0].primary && last.items[0].verified);
    assert_eq!(last.next_page, None);
}

#[tokio::test]
async fn test_org_membership_status_mapping() {
    let api = api(&serve().await);

    assert!(api.is_org_member(ACCESS_TOKEN, "yes", "octocat").await.unwrap());
    assert!(!api.is_org_member(ACCESS_TOKEN, "no", "octocat").await.unwrap());
    assert!(!api.is_org_member(ACCESS_TOKEN, "redir", "octocat").await.unwrap());
    assert!(matches!(
        api.is_org_member(ACCESS_TOKEN, "broken", "octocat").await,
        Err(GlueError::ProfileFetchFailed { .. })
    ));
}

#[tokio::test]
async fn test_enterprise_calls_use_api_v3() {
    let base = serve().await;
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    let settings = settings().with_enterprise_url(&base);
    let api = RestGitHubApi::new(http, &settings, GitHubEndpoints::from_settings(&settings));

    let token = api.exchange_code("code-1", VERIFIER).await.unwrap();
    let user = api.authenticated_user(&token.access_token).await.unwrap();
    assert_eq!(user.login, "ghe-octocat");

    assert!(api
        .is_org_member(&token.access_token, "yes", "ghe-octocat")
        .await
        .unwrap());
}
