//! Password reset tokens.

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MembershipError;
use crate::id::RecordId;

/// Table holding reset tokens.
pub const PASSWORD_RESETS_TABLE: &str = "password_resets";

/// Hours a reset link stays valid.
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Generates a 32-byte random token, hex encoded.
#[must_use]
pub fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// A new reset token row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPasswordReset {
    /// Member the token belongs to.
    pub member_id: RecordId,
    /// Address the link is sent to.
    pub email: String,
    /// Secret token.
    pub token: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
    /// Always false on creation.
    pub used: bool,
}

impl NewPasswordReset {
    /// Issues a fresh token valid for [`RESET_TOKEN_TTL_HOURS`].
    #[must_use]
    pub fn issue(member_id: RecordId, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            member_id,
            email: email.to_string(),
            token: generate_reset_token(),
            expires_at: now + Duration::hours(RESET_TOKEN_TTL_HOURS),
            used: false,
        }
    }
}

/// A stored reset token row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordReset {
    /// Row id.
    pub id: RecordId,
    /// Member the token belongs to.
    pub member_id: RecordId,
    /// Address the link was sent to.
    #[serde(default)]
    pub email: Option<String>,
    /// Secret token.
    pub token: String,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
    /// Whether the token was redeemed.
    #[serde(default)]
    pub used: bool,
}

impl PasswordReset {
    /// Checks that the token is unused and unexpired at `now`.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> Result<(), MembershipError> {
        if self.used {
            return Err(MembershipError::ResetTokenUsed);
        }
        if self.expires_at < now {
            return Err(MembershipError::ResetTokenExpired);
        }
        Ok(())
    }
}

/// Patch marking a token as redeemed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarkUsed {
    /// Always true.
    pub used: bool,
}

/// Validates a new password against its confirmation.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), MembershipError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MembershipError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirmation {
        return Err(MembershipError::PasswordMismatch);
    }
    Ok(())
}

/// Link placed in the reset email.
#[must_use]
pub fn reset_link(frontend_url: &str, token: &str) -> String {
    format!("{}/MemberLogin.html?token={token}", frontend_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(used: bool, expires_at: DateTime<Utc>) -> PasswordReset {
        PasswordReset {
            id: RecordId::Int(1),
            member_id: RecordId::Int(2),
            email: None,
            token: generate_reset_token(),
            expires_at,
            used,
        }
    }

    #[test]
    fn test_token_shape() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn test_issue_expires_in_a_day() {
        let now = Utc::now();
        let reset = NewPasswordReset::issue(RecordId::Int(5), "a@b.com", now);
        assert_eq!(reset.expires_at - now, Duration::hours(24));
        assert!(!reset.used);
    }

    #[test]
    fn test_redeemable() {
        let now = Utc::now();
        assert!(stored(false, now + Duration::hours(1)).ensure_redeemable(now).is_ok());
        assert_eq!(
            stored(true, now + Duration::hours(1)).ensure_redeemable(now),
            Err(MembershipError::ResetTokenUsed)
        );
        assert_eq!(
            stored(false, now - Duration::seconds(1)).ensure_redeemable(now),
            Err(MembershipError::ResetTokenExpired)
        );
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password("secret1", "secret1").is_ok());
        assert_eq!(
            validate_new_password("short", "short"),
            Err(MembershipError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            validate_new_password("secret1", "secret2"),
            Err(MembershipError::PasswordMismatch)
        );
    }

    #[test]
    fn test_reset_link() {
        assert_eq!(
            reset_link("https://voiceanchors.test/", "abc"),
            "https://voiceanchors.test/MemberLogin.html?token=abc"
        );
    }
}
