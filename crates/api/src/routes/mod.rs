//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod activities;
pub mod applications;
pub mod auth;
pub mod email;
pub mod health;
pub mod me;
pub mod members;
pub mod password_reset;

/// Creates the `/api` router.
///
/// Admin and member routes authenticate through the
/// [`AdminUser`](crate::middleware::AdminUser) and
/// [`MemberUser`](crate::middleware::MemberUser) extractors.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(email::routes())
        .merge(members::routes())
        .merge(me::routes())
        .merge(applications::routes())
        .merge(activities::routes())
        .merge(password_reset::routes())
}
