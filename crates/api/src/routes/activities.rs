//! Activities feed: photos and videos.

use anchors_core::RecordId;
use anchors_core::media::MediaUpload;
use anchors_shared::AppError;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use chrono::Utc;

use crate::extractors::{MAX_UPLOAD_BYTES, UploadForm};
use crate::middleware::AdminUser;
use crate::{ApiError, ApiResult, AppState};

/// Creates the activities router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/activities",
            get(list).post(publish).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/activities/{id}", delete(remove))
}

/// GET /activities - Newest first.
async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<MediaUpload>>> {
    Ok(Json(state.backend.media().list().await?))
}

/// POST /activities - Multipart `title`, `description`, `file`.
async fn publish(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MediaUpload>)> {
    let mut form = UploadForm::read(multipart).await?;
    let title = form
        .field("title")
        .ok_or_else(|| ApiError(AppError::Validation("Title is required".to_string())))?
        .to_string();
    let description = form.field("description").map(str::to_string);
    let file = form.take_file()?;

    let media = state
        .backend
        .media()
        .publish(&title, description.as_deref(), file, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// DELETE /activities/{id}
async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .backend
        .media()
        .delete(&RecordId::from(id.as_str()))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
