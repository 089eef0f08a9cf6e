//! HTTP Basic authentication for admin and member routes.
//!
//! Credentials are compared in plaintext: admins against configuration,
//! members against their `members` row. There are no sessions or tokens on
//! this side; every protected request carries the pair again.

use anchors_core::member::Member;
use anchors_shared::AppError;
use axum::http::{HeaderMap, request::Parts};
use axum::extract::FromRequestParts;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use tracing::info;

use crate::{ApiError, AppState};

/// Reads the Basic credentials, if present and well formed.
fn basic_credentials(headers: &HeaderMap) -> Result<Authorization<Basic>, ApiError> {
    headers.typed_get::<Authorization<Basic>>().ok_or_else(|| {
        ApiError(AppError::Unauthorized(
            "Authorization header with Basic credentials is required".to_string(),
        ))
    })
}

/// The signed-in administrator.
///
/// ```ignore
/// async fn handler(admin: AdminUser) -> impl IntoResponse {
///     let reviewer = admin.username();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminUser {
    username: String,
}

impl AdminUser {
    /// Admin username, recorded as the reviewer of applications.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(admin) = &state.admin else {
            return Err(ApiError(AppError::Unauthorized(
                "Admin sign-in is not configured".to_string(),
            )));
        };
        let credentials = basic_credentials(&parts.headers)?;
        admin
            .verify(credentials.username(), credentials.password())
            .inspect_err(|_| info!(username = credentials.username(), "rejected admin credentials"))?;

        Ok(Self {
            username: admin.username().to_string(),
        })
    }
}

/// The signed-in member, loaded fresh from the backend.
#[derive(Debug, Clone)]
pub struct MemberUser(pub Member);

impl MemberUser {
    /// The member row.
    #[must_use]
    pub const fn member(&self) -> &Member {
        &self.0
    }
}

impl FromRequestParts<AppState> for MemberUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = basic_credentials(&parts.headers)?;
        let member = state
            .backend
            .members()
            .authenticate(credentials.username(), credentials.password())
            .await?;
        Ok(Self(member))
    }
}
