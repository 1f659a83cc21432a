//! Warehouse ROI Assessment Platform - Backend Server

use std::net::SocketAddr;

use anyhow::Context;
use roi_server::{config::Config, create_app, services::AuthService, storage, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may set RUST_LOG and ROI_LOG_FORMAT, so load it before tracing
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;

    tracing::info!("Starting Warehouse ROI Server");
    tracing::info!("Environment: {}", config.environment);

    let store = storage::connect(&config).await?;

    // First-run admin account
    if let (Some(username), Some(password)) = (
        config.bootstrap.admin_username.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) {
        AuthService::new(store.clone(), &config)
            .ensure_bootstrap_admin(username, password)
            .await?;
    }

    // Create application state
    let state = AppState::new(store, config.clone());

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Human-readable logs by default; JSON lines when `ROI_LOG_FORMAT=json`
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roi_server=debug,tower_http=debug,sqlx=warn".into());

    let json = std::env::var("ROI_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
