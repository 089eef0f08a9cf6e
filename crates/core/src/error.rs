//! Membership rule violations.

use anchors_shared::AppError;
use thiserror::Error;

use crate::application::ApplicationStatus;

/// Errors raised by membership rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MembershipError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// The application already has a final status.
    #[error("application has already been {status}")]
    AlreadyReviewed {
        /// Current status.
        status: ApplicationStatus,
    },

    /// Uploaded file is neither a photo nor a video.
    #[error("unsupported media type '{content_type}', please upload a photo or video file")]
    UnsupportedMedia {
        /// The offered content type.
        content_type: String,
    },

    /// Password shorter than the minimum.
    #[error("password must be at least {min} characters long")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Reset token already redeemed.
    #[error("this reset link has already been used")]
    ResetTokenUsed,

    /// Reset token past its expiry.
    #[error("this reset link has expired, please request a new one")]
    ResetTokenExpired,

    /// Username/password pair did not match.
    #[error("invalid username or password")]
    InvalidCredentials,
}

impl From<garde::Report> for MembershipError {
    fn from(report: garde::Report) -> Self {
        Self::Validation(report.to_string())
    }
}

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            MembershipError::AlreadyReviewed { .. }
            | MembershipError::ResetTokenUsed
            | MembershipError::ResetTokenExpired => Self::BusinessRule(err.to_string()),
            MembershipError::Validation(_)
            | MembershipError::UnsupportedMedia { .. }
            | MembershipError::PasswordTooShort { .. }
            | MembershipError::PasswordMismatch => Self::Validation(err.to_string()),
        }
    }
}
