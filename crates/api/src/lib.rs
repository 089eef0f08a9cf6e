//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for the public site, members, and admins
//! - Basic-auth extractors for admin and member routes
//! - The JSON error response type

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use anchors_core::auth::AdminCredentials;
use anchors_db::Backend;
use anchors_shared::{EmailService, SiteConfig};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Hosted backend adapter.
    pub backend: Backend,
    /// Email service for notifications.
    pub email_service: Arc<EmailService>,
    /// Site-level settings.
    pub site: Arc<SiteConfig>,
    /// Admin sign-in pair. Admin routes reject every request when unset.
    pub admin: Option<AdminCredentials>,
    /// When the process started, for the health endpoint.
    pub started_at: Instant,
}

impl AppState {
    /// Builds state from its parts, reading admin credentials from `site`.
    #[must_use]
    pub fn new(backend: Backend, email_service: EmailService, site: SiteConfig) -> Self {
        let admin = AdminCredentials::new(site.admin_username.clone(), site.admin_password.clone());
        Self {
            backend,
            email_service: Arc::new(email_service),
            site: Arc::new(site),
            admin,
            started_at: Instant::now(),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
