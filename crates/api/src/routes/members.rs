//! Member directory and admin member management.

use anchors_core::RecordId;
use anchors_core::member::{Member, MemberProfile, NewMember};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::middleware::AdminUser;
use crate::{ApiResult, AppState};

/// Creates the members router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route("/members/{id}", delete(delete_member))
}

/// Request body for creating a member.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    /// Unique username.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Unique email address.
    pub email: String,
    /// Optional display name; defaults to the username.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// GET /members - Public directory, newest first.
async fn list_members(State(state): State<AppState>) -> ApiResult<Json<Vec<MemberProfile>>> {
    Ok(Json(state.backend.members().directory().await?))
}

/// POST /members - Create a member and send the welcome email.
async fn create_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let mut new_member = NewMember::new(&payload.username, &payload.password, &payload.email)?;
    if let Some(name) = payload.display_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        new_member.display_name = name.to_string();
    }

    let member = state.backend.members().create(&new_member).await?;

    if let Err(err) = state
        .email_service
        .send_welcome(&new_member.email, &member.username)
        .await
    {
        warn!(member_id = %member.id, error = %err, "welcome email not sent");
    }
    Ok((StatusCode::CREATED, Json(member)))
}

/// DELETE /members/{id} - Remove a member.
async fn delete_member(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = RecordId::from(id.as_str());
    state.backend.members().delete(&id).await?;
    info!(member_id = %id, admin = admin.username(), "member removed by admin");
    Ok(StatusCode::NO_CONTENT)
}
