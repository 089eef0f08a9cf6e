//! Membership applications and their review workflow.

use std::fmt;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::MembershipError;
use crate::id::RecordId;
use crate::member::valid_email;

/// Table holding application rows.
pub const APPLICATIONS_TABLE: &str = "applications";

/// Application review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Accepted by an admin.
    Approved,
    /// Declined by an admin.
    Rejected,
}

impl ApplicationStatus {
    /// Database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Row id.
    pub id: RecordId,
    /// Applicant email.
    pub email: String,
    /// TikTok handle without the leading `@`.
    #[serde(default)]
    pub tiktok_username: Option<String>,
    /// Review status.
    #[serde(default)]
    pub status: ApplicationStatus,
    /// Admin who reviewed the application.
    #[serde(default)]
    pub reviewed_by: Option<String>,
    /// When it was reviewed.
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Submission time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Admin decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve the applicant.
    Approve,
    /// Reject the applicant.
    Reject,
}

impl ReviewDecision {
    /// Status the application moves to.
    #[must_use]
    pub const fn status(self) -> ApplicationStatus {
        match self {
            Self::Approve => ApplicationStatus::Approved,
            Self::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Patch recording a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationReview {
    /// New status.
    pub status: ApplicationStatus,
    /// Reviewer name.
    pub reviewed_by: String,
    /// Review time.
    pub reviewed_at: DateTime<Utc>,
}

impl Application {
    /// Produces the review patch for this application.
    ///
    /// Only pending applications can be reviewed.
    pub fn review(
        &self,
        decision: ReviewDecision,
        reviewer: &str,
        at: DateTime<Utc>,
    ) -> Result<ApplicationReview, MembershipError> {
        if self.status != ApplicationStatus::Pending {
            return Err(MembershipError::AlreadyReviewed {
                status: self.status,
            });
        }
        Ok(ApplicationReview {
            status: decision.status(),
            reviewed_by: reviewer.to_string(),
            reviewed_at: at,
        })
    }
}

/// Input for submitting an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct NewApplication {
    /// Applicant email.
    #[garde(custom(valid_email))]
    pub email: String,
    /// TikTok handle.
    #[garde(length(min = 1))]
    pub tiktok_username: String,
    /// Always `pending` on submission.
    #[garde(skip)]
    pub status: ApplicationStatus,
}

impl NewApplication {
    /// Normalizes and validates a submission. Leading `@`s are stripped
    /// from the TikTok handle.
    pub fn new(email: &str, tiktok_username: &str) -> Result<Self, MembershipError> {
        let application = Self {
            email: email.trim().to_string(),
            tiktok_username: tiktok_username.trim().trim_start_matches('@').to_string(),
            status: ApplicationStatus::Pending,
        };
        application.validate()?;
        Ok(application)
    }
}

/// Per-status counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Pending applications.
    pub pending: usize,
    /// Approved applications.
    pub approved: usize,
    /// Rejected applications.
    pub rejected: usize,
}

impl StatusCounts {
    /// Tallies applications by status.
    #[must_use]
    pub fn tally(applications: &[Application]) -> Self {
        applications
            .iter()
            .fold(Self::default(), |mut counts, app| {
                match app.status {
                    ApplicationStatus::Pending => counts.pending += 1,
                    ApplicationStatus::Approved => counts.approved += 1,
                    ApplicationStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}
