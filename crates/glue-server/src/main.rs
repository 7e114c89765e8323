//! Glue - Sign-in server

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::Settings;
use glue_api::AppState;
use glue_db::MemoryAuthStore;
use glue_identity::{AuthFlow, MemoryPendingAuthStore, ProviderRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let settings = Settings::load().context("Failed to load configuration")?;

    info!("Starting Glue v{}", env!("CARGO_PKG_VERSION"));

    let state = initialize_services(&settings)?;
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glue=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn initialize_services(settings: &Settings) -> Result<AppState> {
    let registry = ProviderRegistry::from_settings(&settings.providers)
        .context("Failed to build provider registry")?;
    info!("Registered providers: {:?}", registry.ids());

    let pending = MemoryPendingAuthStore::new(Duration::from_secs(settings.auth.pending_ttl_secs));
    let flow = AuthFlow::new(
        Arc::new(registry),
        Arc::new(MemoryAuthStore::new()),
        Arc::new(pending),
    )
    .with_complete_timeout(Duration::from_secs(settings.auth.complete_timeout_secs));

    let state = AppState::new(flow)
        .with_session_ttl(chrono::Duration::seconds(settings.auth.session_ttl_secs));

    info!("All services initialized successfully");
    Ok(state)
}

fn create_app(state: AppState) -> Router {
    glue_api::create_router(state).layer(TraceLayer::new_for_http())
}
