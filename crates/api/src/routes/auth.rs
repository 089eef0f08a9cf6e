//! Sign-in routes for admins and members.

use anchors_core::auth::Role;
use anchors_core::member::Member;
use anchors_shared::AppError;
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/admin", post(admin_login))
        .route("/auth/member", post(member_login))
}

/// Username/password pair.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Successful sign-in.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed-in role.
    pub role: Role,
    /// Username as configured or stored.
    pub username: String,
    /// Member row, for member sign-ins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
}

/// POST /auth/admin - Check the configured admin pair.
async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let admin = state.admin.as_ref().ok_or_else(|| {
        ApiError(AppError::Unauthorized("Admin sign-in is not configured".to_string()))
    })?;
    admin.verify(payload.username.trim(), &payload.password)?;

    info!(username = admin.username(), "admin signed in");
    Ok(Json(LoginResponse {
        role: Role::Admin,
        username: admin.username().to_string(),
        member: None,
    }))
}

/// POST /auth/member - Check a member's stored pair.
async fn member_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let member = state
        .backend
        .members()
        .authenticate(payload.username.trim(), &payload.password)
        .await?;

    info!(member_id = %member.id, "member signed in");
    Ok(Json(LoginResponse {
        role: Role::Member,
        username: member.username.clone(),
        member: Some(member),
    }))
}
