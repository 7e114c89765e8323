//! Common utilities and types for provider implementations

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use reqwest::{redirect, Client};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use glue_core::{GlueError, Result};

/// Request timeout for calls to identity providers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle connections kept per provider host
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 20;

/// User agent sent to provider APIs
pub const USER_AGENT: &str = concat!("glue-auth/", env!("CARGO_PKG_VERSION"));

/// Bytes of entropy in a PKCE verifier (43 base64url characters)
const VERIFIER_BYTES: usize = 32;

/// Bytes of entropy in a generated flow state
const STATE_BYTES: usize = 24;

/// Build the HTTP client shared by all providers.
///
/// Redirects are not followed: provider APIs answer membership checks with
/// redirects that must be read as a negative result.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(DEFAULT_MAX_IDLE_PER_HOST)
        .redirect(redirect::Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| GlueError::internal_error(format!("Failed to create HTTP client: {}", e)))
}

// =============================================================================
// PKCE & State
// =============================================================================

fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a fresh PKCE code verifier
pub fn generate_code_verifier() -> String {
    random_urlsafe(VERIFIER_BYTES)
}

/// S256 code challenge for a verifier: `BASE64URL(SHA256(verifier))`
pub fn s256_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generate an opaque anti-CSRF state value
pub fn generate_state() -> String {
    random_urlsafe(STATE_BYTES)
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination helper for page-numbered API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginatedRequest {
    /// 1-based page number
    pub page: u32,
    /// Page size, `None` for the provider default
    pub page_size: Option<u32>,
}

impl Default for PaginatedRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
        }
    }
}

/// Pagination response
#[derive(Debug, Clone)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    /// Next page to request, `None` on the last page
    pub next_page: Option<u32>,
}

/// Helper to collect all pages
pub async fn collect_all_pages<T, F, Fut>(fetch_page: F, page_size: Option<u32>) -> Result<Vec<T>>
where
    F: Fn(PaginatedRequest) -> Fut,
    Fut: Future<Output = Result<PaginatedResponse<T>>>,
{
    let mut all_items = Vec::new();
    let mut request = PaginatedRequest { page: 1, page_size };

    loop {
        let response = fetch_page(request).await?;
        all_items.extend(response.items);

        match response.next_page {
            // A next page that does not advance would loop forever
            Some(next) if next > request.page => request.page = next,
            Some(next) => {
                debug!("Ignoring non-advancing next page {} after {}", next, request.page);
                break;
            }
            None => break,
        }
    }

    Ok(all_items)
}

/// Extract the `page` query parameter of the `rel="next"` entry of an
/// RFC 8288 `Link` header
pub fn next_page_from_link(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|p| p.trim().replace(' ', "") == "rel=\"next\"");
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = url::Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}
