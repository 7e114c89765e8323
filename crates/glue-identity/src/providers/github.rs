//! GitHub OAuth2 provider
//!
//! Authorization code flow with PKCE against github.com or a GitHub
//! Enterprise instance. Completion resolves a verified primary email,
//! enforces the organization allow-list and hands the candidate user to the
//! [`AuthStore`] for reconciliation.
//!
//! All REST traffic goes through the [`GitHubApi`] seam so the flow can be
//! driven without a network.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use glue_core::{
    Account, AccountType, AuthIntent, AuthParams, AuthStore, GlueError, Provider, ProviderType,
    Result, User,
};

use super::common::*;
use crate::settings::GitHubSettings;

/// Registry key and `Account::provider` value
pub const GITHUB_PROVIDER_ID: &str = "github";

/// Scopes always requested
pub const DEFAULT_SCOPES: [&str; 2] = ["user:email", "read:user"];

/// Scopes that grant access to `/user/emails`
const EMAIL_SCOPES: [&str; 2] = ["user", "user:email"];

const GITHUB_API_ACCEPT: &str = "application/vnd.github+json";

// =============================================================================
// Endpoints
// =============================================================================

/// OAuth and REST endpoints of a GitHub installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub device_auth_url: String,
    pub api_url: String,
}

impl GitHubEndpoints {
    /// Public github.com
    pub fn github() -> Self {
        Self {
            auth_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            device_auth_url: "https://github.com/login/device/code".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }

    /// GitHub Enterprise Server rooted at `base`
    pub fn enterprise(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{}/login/oauth/authorize", base),
            token_url: format!("{}/login/oauth/access_token", base),
            device_auth_url: format!("{}/login/device/code", base),
            api_url: format!("{}/api/v3", base),
        }
    }

    pub fn from_settings(settings: &GitHubSettings) -> Self {
        match settings.enterprise_base() {
            Some(base) => Self::enterprise(base),
            None => Self::github(),
        }
    }

    /// REST URL for `segments` under the API root. Each segment is
    /// percent-encoded, so a `/` or `?` inside one stays inside it.
    pub fn api_endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            GlueError::config_error(format!("Invalid API URL {}: {}", self.api_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| GlueError::config_error(format!("Invalid API URL {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Default for GitHubEndpoints {
    fn default() -> Self {
        Self::github()
    }
}

// =============================================================================
// API Models
// =============================================================================

/// Authenticated user as returned by `GET /user`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Entry of `GET /user/emails`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub visibility: Option<String>,
}

/// Access token obtained from the token endpoint
#[derive(Debug, Clone, Default)]
pub struct OAuthToken {
    pub access_token: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    /// Granted scopes as reported by the provider
    pub scope: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Non-standard response fields
    pub extra: HashMap<String, Value>,
}

impl OAuthToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: Some("bearer".to_string()),
            ..Default::default()
        }
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Scopes granted to this token, `None` if the response did not say.
    /// GitHub separates them with commas.
    pub fn granted_scopes(&self) -> Option<Vec<&str>> {
        self.scope.as_deref().map(|s| {
            s.split([',', ' '])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

impl TokenResponse {
    fn into_token(self) -> Result<OAuthToken> {
        if let Some(error) = self.error {
            return Err(GlueError::token_exchange(match self.error_description {
                Some(description) => format!("{}: {}", error, description),
                None => error,
            }));
        }

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GlueError::token_exchange("Response did not contain an access token"))?;

        Ok(OAuthToken {
            access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            scope: self.scope,
            expires_at: self
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
            extra: self.extra,
        })
    }
}

// =============================================================================
// REST Seam
// =============================================================================

/// GitHub calls made while completing a sign-in
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Redeem an authorization code together with its PKCE verifier
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<OAuthToken>;

    async fn authenticated_user(&self, access_token: &str) -> Result<GitHubUser>;

    /// One page of the user's email addresses
    async fn list_emails(
        &self,
        access_token: &str,
        request: PaginatedRequest,
    ) -> Result<PaginatedResponse<GitHubEmail>>;

    async fn is_org_member(&self, access_token: &str, org: &str, login: &str) -> Result<bool>;
}

/// [`GitHubApi`] over HTTPS
pub struct RestGitHubApi {
    http: Client,
    endpoints: GitHubEndpoints,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl RestGitHubApi {
    pub fn new(http: Client, settings: &GitHubSettings, endpoints: GitHubEndpoints) -> Self {
        Self {
            http,
            endpoints,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_url: settings.callback_url.clone(),
        }
    }

    fn api_get(&self, segments: &[&str], access_token: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.endpoints.api_endpoint(segments)?;
        Ok(self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, GITHUB_API_ACCEPT))
    }

    async fn api_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<(T, Option<String>)> {
        let response = request
            .send()
            .await
            .map_err(|e| GlueError::profile_fetch(format!("Failed to fetch {}: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GlueError::profile_fetch(format!(
                "Failed to fetch {}: GitHub returned {}",
                what, status
            )));
        }

        let link = response
            .headers()
            .get(header::LINK)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let body = response
            .json()
            .await
            .map_err(|e| GlueError::profile_fetch(format!("Failed to parse {}: {}", what, e)))?;

        Ok((body, link))
    }
}

#[async_trait]
impl GitHubApi for RestGitHubApi {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<OAuthToken> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(&self.endpoints.token_url)
            .header(header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| GlueError::token_exchange(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GlueError::token_exchange(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| GlueError::token_exchange(format!("Invalid token response: {}", e)))?;

        body.into_token()
    }

    async fn authenticated_user(&self, access_token: &str) -> Result<GitHubUser> {
        let (user, _) = self
            .api_json(self.api_get(&["user"], access_token)?, "user profile")
            .await?;
        Ok(user)
    }

    async fn list_emails(
        &self,
        access_token: &str,
        request: PaginatedRequest,
    ) -> Result<PaginatedResponse<GitHubEmail>> {
        let mut query = vec![("page", request.page.to_string())];
        if let Some(size) = request.page_size {
            query.push(("per_page", size.to_string()));
        }

        let (items, link) = self
            .api_json(
                self.api_get(&["user", "emails"], access_token)?.query(&query),
                "user emails",
            )
            .await?;

        Ok(PaginatedResponse {
            items,
            next_page: link.as_deref().and_then(next_page_from_link),
        })
    }

    async fn is_org_member(&self, access_token: &str, org: &str, login: &str) -> Result<bool> {
        let response = self
            .api_get(&["orgs", org, "members", login], access_token)?
            .send()
            .await
            .map_err(|e| GlueError::profile_fetch(format!("Membership check failed: {}", e)))?;

        // 302 means the requester itself is not a member of the org
        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::FOUND => Ok(false),
            status => Err(GlueError::profile_fetch(format!(
                "Membership check returned {}",
                status
            ))),
        }
    }
}

// =============================================================================
// Provider
// =============================================================================

/// GitHub OAuth2 provider
pub struct GitHubProvider {
    settings: GitHubSettings,
    endpoints: GitHubEndpoints,
    scopes: Vec<String>,
    api: Arc<dyn GitHubApi>,
    debug: AtomicBool,
}

impl GitHubProvider {
    /// Create a provider with its own HTTP client
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        let http = build_http_client(DEFAULT_TIMEOUT)?;
        Ok(Self::with_client(settings, http))
    }

    /// Create a provider on a shared HTTP client
    pub fn with_client(settings: GitHubSettings, http: Client) -> Self {
        let api = RestGitHubApi::new(http, &settings, GitHubEndpoints::from_settings(&settings));
        Self::with_api(settings, Arc::new(api))
    }

    /// Create a provider on a custom [`GitHubApi`]
    pub fn with_api(settings: GitHubSettings, api: Arc<dyn GitHubApi>) -> Self {
        let endpoints = GitHubEndpoints::from_settings(&settings);
        let scopes = merge_scopes(&settings.scopes);

        Self {
            settings,
            endpoints,
            scopes,
            api,
            debug: AtomicBool::new(false),
        }
    }

    /// Override the browser-facing endpoints, e.g. when GitHub sits behind
    /// a proxy. REST calls keep using the [`GitHubApi`].
    pub fn with_endpoints(mut self, endpoints: GitHubEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Requested scopes: the defaults followed by configured extras
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn endpoints(&self) -> &GitHubEndpoints {
        &self.endpoints
    }

    fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    fn authorization_url(&self, state: &str, code_challenge: &str) -> Result<String> {
        if self.endpoints.auth_url.trim().is_empty() {
            return Err(GlueError::NoAuthUrlConfigured);
        }

        let mut url = Url::parse(&self.endpoints.auth_url).map_err(|e| {
            GlueError::config_error(format!(
                "Invalid authorization URL {}: {}",
                self.endpoints.auth_url, e
            ))
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url.into())
    }

    /// Candidate user carrying one OAuth2 account built from the token
    fn build_candidate(&self, profile: &GitHubUser, token: &OAuthToken) -> User {
        let mut account = Account::new(AccountType::OAuth2, self.id());
        account.provider_account_id = Some(profile.id.to_string());
        account.access_token = Some(token.access_token.clone());
        account.refresh_token = token.refresh_token.clone();
        account.expires_at = token.expires_at;
        account.token_type = token.token_type.clone();
        account.scope = token.scope.clone();
        account.session_state = token.extra_str("state").unwrap_or_default().to_string();

        let mut user = User::new();
        user.email = profile
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        user.user_metadata
            .insert("login".to_string(), profile.login.clone());
        let optional = [
            ("name", &profile.name),
            ("avatar_url", &profile.avatar_url),
            ("bio", &profile.bio),
            ("location", &profile.location),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                user.user_metadata.insert(key.to_string(), value.to_string());
            }
        }

        user.accounts.push(account);
        user
    }

    /// Whether the token may read `/user/emails`
    fn can_list_emails(&self, token: &OAuthToken) -> bool {
        match token.granted_scopes() {
            Some(granted) => granted.iter().any(|s| EMAIL_SCOPES.contains(s)),
            None => self
                .scopes
                .iter()
                .any(|s| EMAIL_SCOPES.contains(&s.as_str())),
        }
    }

    /// First address that is both primary and verified, across all pages
    async fn primary_verified_email(&self, access_token: &str) -> Result<Option<String>> {
        let api: &dyn GitHubApi = self.api.as_ref();
        let emails =
            collect_all_pages(move |request| api.list_emails(access_token, request), None).await?;

        if self.is_debug() {
            info!("GitHub returned {} email addresses", emails.len());
        }

        Ok(emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email))
    }

    /// Membership in at least one allowed organization. Failed checks count
    /// as "not a member".
    async fn in_allowed_org(&self, access_token: &str, login: &str) -> bool {
        for org in self.settings.orgs() {
            match self.api.is_org_member(access_token, org, login).await {
                Ok(true) => {
                    debug!("{} is a member of {}", login, org);
                    return true;
                }
                Ok(false) => debug!("{} is not a member of {}", login, org),
                Err(e) => warn!(
                    "Membership check of {} in {} failed, treating as not a member: {}",
                    login, org, e
                ),
            }
        }
        false
    }
}

/// Default scopes followed by trimmed, de-duplicated extras
fn merge_scopes(extra: &[String]) -> Vec<String> {
    let mut scopes: Vec<String> = DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect();
    for scope in extra.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !scopes.iter().any(|s| s == scope) {
            scopes.push(scope.to_string());
        }
    }
    scopes
}

#[async_trait]
impl Provider for GitHubProvider {
    fn id(&self) -> &str {
        GITHUB_PROVIDER_ID
    }

    fn name(&self) -> &str {
        "GitHub"
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::OAuth2
    }

    fn debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    #[instrument(skip_all, fields(provider = GITHUB_PROVIDER_ID))]
    async fn begin_auth(
        &self,
        _store: &dyn AuthStore,
        state: &str,
        _params: &dyn AuthParams,
    ) -> Result<AuthIntent> {
        let verifier = generate_code_verifier();
        let auth_url = self.authorization_url(state, &s256_challenge(&verifier))?;

        if self.is_debug() {
            info!("GitHub authorization URL: {}", auth_url);
        } else {
            debug!("Starting GitHub authorization");
        }

        Ok(AuthIntent::new(auth_url, Some(verifier)))
    }

    #[instrument(skip_all, fields(provider = GITHUB_PROVIDER_ID))]
    async fn complete_auth(&self, store: &dyn AuthStore, params: &dyn AuthParams) -> Result<User> {
        let code = params
            .get("code")
            .ok_or_else(|| GlueError::missing_parameter("code"))?;
        let verifier = params
            .code_verifier()
            .ok_or_else(|| GlueError::missing_parameter("code_verifier"))?;

        let token = self.api.exchange_code(&code, &verifier).await?;
        if self.is_debug() {
            info!(
                "GitHub token exchanged (type: {:?}, scope: {:?})",
                token.token_type, token.scope
            );
        }

        let profile = self.api.authenticated_user(&token.access_token).await?;
        debug!("Fetched GitHub profile {} ({})", profile.login, profile.id);

        let mut user = self.build_candidate(&profile, &token);

        if user.email().is_none() {
            if self.can_list_emails(&token) {
                user.email = self.primary_verified_email(&token.access_token).await?;
            } else {
                debug!("Token lacks an email scope, skipping email lookup");
            }
        }

        if user.email().is_none() {
            info!("No verified primary email for GitHub user {}", profile.login);
            return Err(GlueError::NoVerifiedPrimaryEmail);
        }
        user.email_verified_at = Some(Utc::now());

        if self.settings.orgs().next().is_some()
            && !self.in_allowed_org(&token.access_token, &profile.login).await
        {
            info!("GitHub user {} is not in an allowed organization", profile.login);
            return Err(GlueError::OrganizationNotAllowed {
                login: profile.login,
            });
        }

        let created = store.create_user(user).await?;
        let user = store.get_user(created.id).await?;

        info!("GitHub user {} signed in as {}", profile.login, user.id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GitHubSettings {
        GitHubSettings::new("client-123", "secret", "https://app.example.com/auth/github/callback")
    }

    #[test]
    fn test_enterprise_endpoints() {
        let endpoints = GitHubEndpoints::enterprise("https://ghe.example.com/");
        assert_eq!(endpoints.auth_url, "https://ghe.example.com/login/oauth/authorize");
        assert_eq!(endpoints.token_url, "https://ghe.example.com/login/oauth/access_token");
        assert_eq!(endpoints.device_auth_url, "https://ghe.example.com/login/device/code");
        assert_eq!(endpoints.api_url, "https://ghe.example.com/api/v3");

        let blank = settings().with_enterprise_url("  ");
        assert_eq!(GitHubEndpoints::from_settings(&blank), GitHubEndpoints::github());
    }

    #[test]
    fn test_api_endpoint_escapes_segments() {
        let url = GitHubEndpoints::github()
            .api_endpoint(&["orgs", "acme/evil?x=1", "members", "octocat"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/orgs/acme%2Fevil%3Fx=1/members/octocat"
        );

        let url = GitHubEndpoints::enterprise("https://ghe.example.com")
            .api_endpoint(&["user", "emails"])
            .unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/user/emails");
    }

    #[test]
    fn test_scopes_extend_defaults() {
        let scopes = merge_scopes(&["repo".to_string(), "user:email".to_string(), " ".to_string()]);
        assert_eq!(scopes, vec!["user:email", "read:user", "repo"]);
    }

    #[test]
    fn test_authorization_url() {
        let provider = GitHubProvider::new(settings().with_scopes(["repo"])).unwrap();
        let url = provider.authorization_url("state-1", "challenge-1").unwrap();
        let url = Url::parse(&url).unwrap();

        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/login/oauth/authorize");

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["redirect_uri"], "https://app.example.com/auth/github/callback");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "user:email read:user repo");
        assert_eq!(query["state"], "state-1");
        assert_eq!(query["code_challenge"], "challenge-1");
        assert_eq!(query["code_challenge_method"], "S256");
    }

    #[test]
    fn test_missing_auth_url() {
        let provider = GitHubProvider::new(settings())
            .unwrap()
            .with_endpoints(GitHubEndpoints {
                auth_url: String::new(),
                ..GitHubEndpoints::github()
            });

        assert!(matches!(
            provider.authorization_url("s", "c"),
            Err(GlueError::NoAuthUrlConfigured)
        ));
    }

    #[test]
    fn test_token_response_parsing() {
        let body = serde_json::json!({
            "access_token": "gho_abc",
            "token_type": "bearer",
            "scope": "read:user,user:email",
            "expires_in": 28800,
            "state": "opaque"
        });
        let token = serde_json::from_value::<TokenResponse>(body)
            .unwrap()
            .into_token()
            .unwrap();

        assert_eq!(token.access_token, "gho_abc");
        assert_eq!(token.granted_scopes().unwrap(), vec!["read:user", "user:email"]);
        assert_eq!(token.extra_str("state"), Some("opaque"));
        assert!(token.expires_at.unwrap() > Utc::now());
    }

    #[test]
    fn test_token_response_error() {
        let body = serde_json::json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        });
        let err = serde_json::from_value::<TokenResponse>(body)
            .unwrap()
            .into_token()
            .unwrap_err();

        match err {
            GlueError::TokenExchangeFailed { message } => {
                assert!(message.starts_with("bad_verification_code"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_can_list_emails_prefers_granted_scopes() {
        let provider = GitHubProvider::new(settings()).unwrap();

        let mut token = OAuthToken::new("t");
        assert!(provider.can_list_emails(&token));

        token.scope = Some("read:user".to_string());
        assert!(!provider.can_list_emails(&token));

        token.scope = Some("user".to_string());
        assert!(provider.can_list_emails(&token));
    }

    #[test]
    fn test_candidate_user() {
        let provider = GitHubProvider::new(settings()).unwrap();
        let profile = GitHubUser {
            id: 583231,
            login: "octocat".to_string(),
            email: Some("  ".to_string()),
            name: Some("The Octocat".to_string()),
            bio: Some(String::new()),
            ..Default::default()
        };
        let mut token = OAuthToken::new("gho_abc");
        token.extra.insert("state".to_string(), Value::from("opaque"));

        let user = provider.build_candidate(&profile, &token);
        assert!(user.email().is_none());
        assert_eq!(user.user_metadata["login"], "octocat");
        assert_eq!(user.user_metadata["name"], "The Octocat");
        assert!(!user.user_metadata.contains_key("bio"));

        let account = user.account_for("github").unwrap();
        assert_eq!(account.account_type, AccountType::OAuth2);
        assert_eq!(account.provider_account_id.as_deref(), Some("583231"));
        assert_eq!(account.access_token.as_deref(), Some("gho_abc"));
        assert_eq!(account.session_state, "opaque");
    }
}
