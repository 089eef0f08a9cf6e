//! Community members.

use anchors_shared::is_valid_email;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::error::MembershipError;
use crate::id::RecordId;

/// Table holding member rows.
pub const MEMBERS_TABLE: &str = "members";

/// Directory ordering: newest members first.
pub const MEMBER_DIRECTORY_ORDER: &str = "created_at.desc";

/// A member row.
///
/// The password is stored in plaintext by the hosted table; it is never
/// serialized back out of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Row id.
    pub id: RecordId,
    /// Login name.
    pub username: String,
    /// Plaintext password.
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Name shown in the directory.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Short biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Public URL of the profile picture.
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    /// TikTok profile link.
    #[serde(default)]
    pub tiktok_link: Option<String>,
    /// When the member was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Public directory view of this member.
    #[must_use]
    pub fn profile(&self) -> MemberProfile {
        MemberProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: non_empty(self.display_name.as_deref())
                .unwrap_or(&self.username)
                .to_string(),
            bio: non_empty(self.bio.as_deref()).map(str::to_string),
            profile_picture_url: non_empty(self.profile_picture_url.as_deref()).map(str::to_string),
            tiktok_link: non_empty(self.tiktok_link.as_deref()).map(str::to_string),
            joined_at: self.created_at,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// What the public member directory shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Row id.
    pub id: RecordId,
    /// Login name.
    pub username: String,
    /// Display name, falling back to the username.
    pub display_name: String,
    /// Short biography.
    pub bio: Option<String>,
    /// Profile picture URL.
    pub profile_picture_url: Option<String>,
    /// TikTok profile link.
    pub tiktok_link: Option<String>,
    /// Join date.
    pub joined_at: Option<DateTime<Utc>>,
}

#[allow(clippy::ptr_arg, clippy::trivially_copy_pass_by_ref)]
pub(crate) fn valid_email(value: &String, _ctx: &()) -> garde::Result {
    if is_valid_email(value) {
        Ok(())
    } else {
        Err(garde::Error::new("please enter a valid email address"))
    }
}

/// Input for creating a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct NewMember {
    /// Login name.
    #[garde(length(min = 1, max = 64))]
    pub username: String,
    /// Plaintext password.
    #[garde(length(min = 1))]
    pub password: String,
    /// Contact email.
    #[garde(custom(valid_email))]
    pub email: String,
    /// Display name, initially the username.
    #[garde(skip)]
    pub display_name: String,
    /// Biography, initially empty.
    #[garde(skip)]
    pub bio: String,
    /// Profile picture URL, initially empty.
    #[garde(skip)]
    pub profile_picture_url: String,
    /// TikTok link, initially empty.
    #[garde(skip)]
    pub tiktok_link: String,
}

impl NewMember {
    /// Builds and validates a new member.
    pub fn new(username: &str, password: &str, email: &str) -> Result<Self, MembershipError> {
        let username = username.trim().to_string();
        let member = Self {
            display_name: username.clone(),
            username,
            password: password.to_string(),
            email: email.trim().to_string(),
            bio: String::new(),
            profile_picture_url: String::new(),
            tiktok_link: String::new(),
        };
        member.validate()?;
        Ok(member)
    }
}

/// Patch applied when a member edits their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    /// Display name.
    #[garde(length(min = 1))]
    pub display_name: String,
    /// Biography.
    #[serde(default)]
    #[garde(skip)]
    pub bio: String,
    /// TikTok link.
    #[serde(default)]
    #[garde(skip)]
    pub tiktok_link: String,
    /// New picture URL; left untouched when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub profile_picture_url: Option<String>,
}

impl ProfileUpdate {
    /// Trims fields and validates the display name.
    pub fn normalized(mut self) -> Result<Self, MembershipError> {
        self.display_name = self.display_name.trim().to_string();
        self.bio = self.bio.trim().to_string();
        self.tiktok_link = self.tiktok_link.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

/// Patch replacing a member's password.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordPatch {
    /// New plaintext password.
    pub password: String,
}
