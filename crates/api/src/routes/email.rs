//! Email relay routes.
//!
//! Both routes require admin credentials; applicant and member
//! notifications are sent by the routes that trigger them.

use anchors_shared::{AppError, OutgoingEmail};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::middleware::AdminUser;
use crate::{ApiError, ApiResult, AppState};

/// Creates the email router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/send-email", post(send_email))
        .route("/test-email", post(test_email))
}

/// One recipient or several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address.
    One(String),
    /// Several addresses.
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(to) => vec![to],
            Self::Many(to) => to,
        }
    }
}

/// Request body for `/send-email`.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    /// Recipients.
    pub to: Recipients,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    #[serde(default)]
    pub html: Option<String>,
    /// Plain-text body.
    #[serde(default)]
    pub text: Option<String>,
    /// Free-form label for logs.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Request body for `/test-email`.
#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    /// Recipient.
    pub to: String,
}

/// Delivery acknowledgement.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    /// Always true; failures use the error body.
    pub success: bool,
    /// Provider message id.
    pub id: Option<String>,
    /// Human-readable status.
    pub message: &'static str,
    /// Recipients.
    pub to: Vec<String>,
}

/// POST /send-email - Relay a message through the configured transport.
async fn send_email(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<SendEmailRequest>,
) -> ApiResult<Json<SendEmailResponse>> {
    let to = payload.to.into_vec();
    if to.is_empty() || payload.subject.trim().is_empty() {
        return Err(ApiError(AppError::Validation(
            "Missing required fields: to, subject".to_string(),
        )));
    }

    let email = OutgoingEmail {
        to: to.clone(),
        subject: payload.subject,
        html: payload.html,
        text: payload.text,
    };
    let receipt = state.email_service.send(&email).await?;

    info!(
        recipients = to.len(),
        kind = payload.kind.as_deref().unwrap_or("general"),
        id = ?receipt.id,
        "email relayed"
    );
    Ok(Json(SendEmailResponse {
        success: true,
        id: receipt.id,
        message: "Email sent successfully",
        to,
    }))
}

/// POST /test-email - Send the configuration check message.
async fn test_email(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<TestEmailRequest>,
) -> ApiResult<Json<SendEmailResponse>> {
    if payload.to.trim().is_empty() {
        return Err(ApiError(AppError::Validation(
            "Email address is required".to_string(),
        )));
    }
    let receipt = state.email_service.send_test(&payload.to).await?;
    Ok(Json(SendEmailResponse {
        success: true,
        id: receipt.id,
        message: "Test email sent successfully",
        to: vec![payload.to],
    }))
}
