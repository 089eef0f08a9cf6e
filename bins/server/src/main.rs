//! Voice Anchors API Server
//!
//! Main entry point for the Voice Anchors backend service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anchors_api::{AppState, create_router};
use anchors_db::Backend;
use anchors_shared::{AppConfig, EmailService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anchors=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let backend = Backend::connect(&config.backend).context("Failed to configure backend")?;
    info!(provider = backend.provider().name(), "Backend configured");

    let email_service = EmailService::new(config.email.clone());
    match email_service.ensure_configured() {
        Ok(()) => info!(provider = ?email_service.provider(), "Email service configured"),
        Err(err) => warn!(error = %err, "Email service incomplete, notifications will fail"),
    }
    if config.site.admin_username.is_none() || config.site.admin_password.is_none() {
        warn!("Admin credentials are not set, admin routes are closed");
    }

    let state = AppState::new(backend, email_service, config.site.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
