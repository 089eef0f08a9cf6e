//! Admin and member sign-in.
//!
//! Credentials are compared in plaintext against configuration (admin) or
//! the `members` table (member). This mirrors how the site has always
//! worked and is not a secure scheme.

use serde::{Deserialize, Serialize};

use crate::error::MembershipError;
use crate::member::Member;

/// Who is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Site administrator.
    Admin,
    /// Community member.
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// The configured admin username/password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    /// Creates the pair. Returns `None` unless both parts are non-empty.
    #[must_use]
    pub fn new(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self { username, password })
            }
            _ => None,
        }
    }

    /// Admin username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Compares a presented pair.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), MembershipError> {
        if username == self.username && password == self.password {
            Ok(())
        } else {
            Err(MembershipError::InvalidCredentials)
        }
    }
}

/// Finds the member whose username and password both match.
pub fn authenticate_member<'a>(
    members: &'a [Member],
    username: &str,
    password: &str,
) -> Result<&'a Member, MembershipError> {
    members
        .iter()
        .find(|m| m.username == username && m.password == password)
        .ok_or(MembershipError::InvalidCredentials)
}
