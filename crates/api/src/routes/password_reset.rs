//! Password reset by emailed link.

use anchors_core::password_reset::{NewPasswordReset, reset_link, validate_new_password};
use anchors_shared::AppError;
use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Creates the password reset router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/password-reset/request", post(request_reset))
        .route("/password-reset/confirm", post(confirm_reset))
}

/// Request body for a reset link.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    /// Member email address.
    pub email: String,
}

/// Request body for redeeming a link.
#[derive(Debug, Deserialize)]
pub struct ResetConfirm {
    /// Token from the link.
    pub token: String,
    /// New password.
    pub new_password: String,
    /// Must equal `new_password`.
    pub confirm_password: String,
}

/// Human-readable outcome.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Outcome.
    pub message: &'static str,
}

/// POST /password-reset/request - Issue a token and email the link.
async fn request_reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError(AppError::Validation(
            "Please enter your email address".to_string(),
        )));
    }

    let member = state
        .backend
        .members()
        .find_by_email(email)
        .await?
        .ok_or_else(|| {
            ApiError(AppError::NotFound(
                "No account found with this email address".to_string(),
            ))
        })?;

    let reset = NewPasswordReset::issue(member.id.clone(), email, Utc::now());
    state.backend.password_resets().create(&reset).await?;

    let link = reset_link(&state.site.frontend_url, &reset.token);
    state
        .email_service
        .send_password_reset(email, &link)
        .await?;

    info!(member_id = %member.id, "password reset link sent");
    Ok(Json(MessageResponse {
        message: "Password reset link has been sent to your email. Please check your inbox.",
    }))
}

/// POST /password-reset/confirm - Redeem a token.
async fn confirm_reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetConfirm>,
) -> ApiResult<Json<MessageResponse>> {
    validate_new_password(&payload.new_password, &payload.confirm_password)?;

    let resets = state.backend.password_resets();
    let reset = resets
        .find_by_token(&payload.token)
        .await?
        .ok_or_else(|| {
            ApiError(AppError::BusinessRule(
                "Invalid or expired reset token".to_string(),
            ))
        })?;
    reset.ensure_redeemable(Utc::now())?;

    state
        .backend
        .members()
        .set_password(&reset.member_id, &payload.new_password)
        .await?;
    resets.mark_used(&reset.id).await?;

    info!(member_id = %reset.member_id, "password reset redeemed");
    Ok(Json(MessageResponse {
        message: "Password reset successfully! You can now login with your new password.",
    }))
}
