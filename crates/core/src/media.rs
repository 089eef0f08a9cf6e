//! Activity media (photos and videos) and object-key conventions.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::MembershipError;
use crate::id::RecordId;

/// Table holding activity media rows.
pub const MEDIA_TABLE: &str = "media_uploads";

/// Bucket for activity media.
pub const MEDIA_BUCKET: &str = "media-uploads";

/// Bucket for member profile pictures.
pub const PROFILE_PICTURE_BUCKET: &str = "profile-pictures";

/// Activities feed ordering: newest first.
pub const ACTIVITY_ORDER: &str = "upload_date.desc";

/// Kind of uploaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
}

impl MediaKind {
    /// Classifies a MIME type. Only `image/*` and `video/*` are accepted.
    pub fn from_content_type(content_type: &str) -> Result<Self, MembershipError> {
        let lowered = content_type.to_ascii_lowercase();
        if lowered.starts_with("video/") {
            Ok(Self::Video)
        } else if lowered.starts_with("image/") {
            Ok(Self::Photo)
        } else {
            Err(MembershipError::UnsupportedMedia {
                content_type: content_type.to_string(),
            })
        }
    }
}

/// An activity media row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUpload {
    /// Row id.
    pub id: RecordId,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Public URL of the object.
    pub media_url: String,
    /// Photo or video.
    pub media_type: MediaKind,
    /// Upload time.
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
}

/// Input for recording an uploaded media object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct NewMediaUpload {
    /// Title.
    #[garde(length(min = 1))]
    pub title: String,
    /// Description.
    #[garde(skip)]
    pub description: String,
    /// Public URL of the object.
    #[garde(length(min = 1))]
    pub media_url: String,
    /// Photo or video.
    #[garde(skip)]
    pub media_type: MediaKind,
}

impl NewMediaUpload {
    /// Builds and validates a media record.
    pub fn new(
        title: &str,
        description: Option<&str>,
        media_url: String,
        media_type: MediaKind,
    ) -> Result<Self, MembershipError> {
        let upload = Self {
            title: title.trim().to_string(),
            description: description.unwrap_or_default().trim().to_string(),
            media_url,
            media_type,
        };
        upload.validate()?;
        Ok(upload)
    }
}

/// Replaces path separators so a file name stays a single key segment.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Object key for activity media: `<millis>-<file name>`.
#[must_use]
pub fn media_object_key(file_name: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp_millis(), sanitize_filename(file_name))
}

/// Object key for a profile picture: `profile-<member id>-<millis>.<ext>`.
#[must_use]
pub fn profile_picture_key(member_id: &RecordId, file_name: &str, now: DateTime<Utc>) -> String {
    let extension = file_name.rsplit('.').next().unwrap_or(file_name);
    format!(
        "profile-{}-{}.{}",
        sanitize_filename(&member_id.to_string()),
        now.timestamp_millis(),
        sanitize_filename(extension)
    )
}
