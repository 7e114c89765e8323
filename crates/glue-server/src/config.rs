//! Server configuration

use anyhow::Result;
use serde::Deserialize;

use glue_identity::ProvidersSettings;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub providers: ProvidersSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// How long a started sign-in may wait for its callback
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_secs: u64,
    #[serde(default = "default_complete_timeout")]
    pub complete_timeout_secs: u64,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_pending_ttl() -> u64 {
    600
}

fn default_complete_timeout() -> u64 {
    30
}

fn default_session_ttl() -> i64 {
    604800
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("auth.pending_ttl_secs", 600)?
            .set_default("auth.complete_timeout_secs", 30)?
            .set_default("auth.session_ttl_secs", 604800)?
            // Load from config file if present
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Load from environment variables with GLUE__ prefix
            .add_source(
                config::Environment::with_prefix("GLUE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("providers.github.allowed_orgs")
                    .with_list_parse_key("providers.github.scopes"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
