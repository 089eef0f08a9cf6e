//! Repository abstractions for data access.
//!
//! Repositories give the rest of the application typed operations on the
//! community tables, hiding table names, filters, and ordering behind the
//! adapter's [`TableClient`](crate::TableClient).

pub mod application;
pub mod media;
pub mod member;
pub mod password_reset;

use anchors_core::MembershipError;
use anchors_shared::AppError;
use thiserror::Error;

use crate::error::ClientError;

pub use application::ApplicationRepository;
pub use media::{MediaFile, MediaRepository};
pub use member::MemberRepository;
pub use password_reset::PasswordResetRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The adapter call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A membership rule rejected the operation.
    #[error(transparent)]
    Rule(#[from] MembershipError),

    /// The row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique value is already taken.
    #[error("{0}")]
    Duplicate(String),

    /// The row changed between read and write.
    #[error("{0}")]
    Stale(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Client(err) => err.into(),
            RepositoryError::Rule(err) => err.into(),
            RepositoryError::NotFound(what) => Self::NotFound(what),
            RepositoryError::Duplicate(msg) | RepositoryError::Stale(msg) => Self::Conflict(msg),
        }
    }
}
