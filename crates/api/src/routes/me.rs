//! Member self-service: profile, picture, password.

use anchors_core::member::{Member, ProfileUpdate};
use anchors_core::password_reset::validate_new_password;
use anchors_db::{Blob, UploadResult};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::extractors::{MAX_UPLOAD_BYTES, UploadForm};
use crate::middleware::MemberUser;
use crate::{ApiResult, AppState};

/// Creates the member self-service router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/profile", put(update_profile))
        .route(
            "/me/profile-picture",
            post(upload_picture).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/me/password", post(change_password))
}

/// Request body for a password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// New password.
    pub new_password: String,
    /// Must equal `new_password`.
    pub confirm_password: String,
}

/// Result of a picture upload.
#[derive(Debug, Serialize)]
pub struct PictureResponse {
    /// Where the picture is stored.
    pub upload: UploadResult,
    /// The member with the new picture URL.
    pub member: Member,
}

/// PUT /me/profile - Edit the signed-in member's profile.
async fn update_profile(
    State(state): State<AppState>,
    MemberUser(member): MemberUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<Member>> {
    let updated = state
        .backend
        .members()
        .update_profile(&member.id, update)
        .await?;
    info!(member_id = %updated.id, "profile updated");
    Ok(Json(updated))
}

/// POST /me/profile-picture - Upload a picture and point the profile at it.
async fn upload_picture(
    State(state): State<AppState>,
    MemberUser(member): MemberUser,
    multipart: Multipart,
) -> ApiResult<Json<PictureResponse>> {
    let file = UploadForm::read(multipart).await?.take_file()?;
    let members = state.backend.members();

    let blob = Blob::new(file.bytes).with_content_type(file.content_type);
    let upload = members
        .upload_profile_picture(&member.id, &file.file_name, blob, Utc::now())
        .await?;

    let update = ProfileUpdate {
        display_name: member
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| member.username.clone()),
        bio: member.bio.clone().unwrap_or_default(),
        tiktok_link: member.tiktok_link.clone().unwrap_or_default(),
        profile_picture_url: Some(upload.url.clone()),
    };
    let member = members.update_profile(&member.id, update).await?;

    Ok(Json(PictureResponse { upload, member }))
}

/// POST /me/password - Replace the signed-in member's password.
async fn change_password(
    State(state): State<AppState>,
    MemberUser(member): MemberUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    validate_new_password(&payload.new_password, &payload.confirm_password)?;
    state
        .backend
        .members()
        .set_password(&member.id, &payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
