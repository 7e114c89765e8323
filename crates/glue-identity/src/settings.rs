//! Provider configuration types
//!
//! Deserialized from the `providers` section of the server configuration.

use serde::Deserialize;
use std::fmt;

/// Settings for every configurable provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersSettings {
    /// GitHub OAuth app, disabled when absent
    #[serde(default)]
    pub github: Option<GitHubSettings>,

    /// Enable verbose provider diagnostics
    #[serde(default)]
    pub debug: bool,
}

/// GitHub (or GitHub Enterprise) OAuth app configuration
#[derive(Clone, Default, Deserialize)]
pub struct GitHubSettings {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,

    /// Base URL of a GitHub Enterprise instance, e.g. `https://ghe.example.com`
    #[serde(default)]
    pub enterprise_url: Option<String>,

    /// Organizations a user must belong to; empty allows everyone
    #[serde(default)]
    pub allowed_orgs: Vec<String>,

    /// Scopes requested in addition to the defaults
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl GitHubSettings {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
            ..Default::default()
        }
    }

    pub fn with_enterprise_url(mut self, url: impl Into<String>) -> Self {
        self.enterprise_url = Some(url.into());
        self
    }

    pub fn with_allowed_orgs<I, S>(mut self, orgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_orgs = orgs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Enterprise base URL with surrounding whitespace and trailing slashes
    /// removed, `None` when unset or blank
    pub fn enterprise_base(&self) -> Option<&str> {
        self.enterprise_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }

    /// Allowed organizations with blanks dropped
    pub fn orgs(&self) -> impl Iterator<Item = &str> {
        self.allowed_orgs
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
    }
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("enterprise_url", &self.enterprise_url)
            .field("allowed_orgs", &self.allowed_orgs)
            .field("scopes", &self.scopes)
            .finish()
    }
}
