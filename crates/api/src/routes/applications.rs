//! Membership application routes.

use anchors_core::RecordId;
use anchors_core::application::{
    Application, ApplicationStatus, NewApplication, ReviewDecision, StatusCounts,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::middleware::AdminUser;
use crate::{ApiResult, AppState};

/// Creates the applications router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/applications", post(submit).get(list))
        .route("/applications/{id}/approve", post(approve))
        .route("/applications/{id}/reject", post(reject))
}

/// Request body for a new application.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Applicant email.
    pub email: String,
    /// TikTok handle, with or without the leading `@`.
    pub tiktok_username: String,
}

/// Query parameters for listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only applications in this status.
    pub status: Option<ApplicationStatus>,
}

/// Applications with per-status counts.
#[derive(Debug, Serialize)]
pub struct ApplicationList {
    /// Counts over the returned applications.
    pub counts: StatusCounts,
    /// Newest first.
    pub applications: Vec<Application>,
}

/// A review outcome.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    /// The reviewed application.
    pub application: Application,
    /// Whether the applicant was notified. The review stands either way.
    pub email_sent: bool,
}

/// POST /applications - Submit an application and confirm by email.
async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    let application = NewApplication::new(&payload.email, &payload.tiktok_username)?;
    let created = state.backend.applications().submit(&application).await?;

    if let Err(err) = state
        .email_service
        .send_application_received(&created.email)
        .await
    {
        warn!(application_id = %created.id, error = %err, "confirmation email not sent");
    }
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /applications - All applications, optionally by status.
async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApplicationList>> {
    let repo = state.backend.applications();
    let applications = match query.status {
        Some(status) => repo.list_by_status(status).await?,
        None => repo.list().await?,
    };
    Ok(Json(ApplicationList {
        counts: StatusCounts::tally(&applications),
        applications,
    }))
}

/// POST /applications/{id}/approve
async fn approve(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ReviewResponse>> {
    review(&state, &admin, &id, ReviewDecision::Approve).await
}

/// POST /applications/{id}/reject
async fn reject(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ReviewResponse>> {
    review(&state, &admin, &id, ReviewDecision::Reject).await
}

async fn review(
    state: &AppState,
    admin: &AdminUser,
    id: &str,
    decision: ReviewDecision,
) -> ApiResult<Json<ReviewResponse>> {
    let application = state
        .backend
        .applications()
        .review(&RecordId::from(id), decision, admin.username(), Utc::now())
        .await?;

    let sent = match decision {
        ReviewDecision::Approve => {
            state
                .email_service
                .send_application_approved(&application.email)
                .await
        }
        ReviewDecision::Reject => {
            state
                .email_service
                .send_application_rejected(&application.email)
                .await
        }
    };
    let email_sent = sent
        .inspect_err(|err| {
            warn!(application_id = %application.id, error = %err, "review email not sent");
        })
        .is_ok();

    Ok(Json(ReviewResponse {
        application,
        email_sent,
    }))
}
