//! Password reset token repository.

use anchors_core::RecordId;
use anchors_core::password_reset::{
    MarkUsed, NewPasswordReset, PASSWORD_RESETS_TABLE, PasswordReset,
};

use crate::client::TableClient;
use crate::error::ClientError;
use crate::query::{Filters, QuerySpec};

/// Password reset token repository.
#[derive(Debug, Clone)]
pub struct PasswordResetRepository {
    tables: TableClient,
}

impl PasswordResetRepository {
    /// Creates a new password reset repository.
    #[must_use]
    pub const fn new(tables: TableClient) -> Self {
        Self { tables }
    }

    /// Stores a freshly issued token.
    pub async fn create(&self, reset: &NewPasswordReset) -> Result<PasswordReset, ClientError> {
        self.tables.insert_one(PASSWORD_RESETS_TABLE, reset).await
    }

    /// Finds a token row.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<PasswordReset>, ClientError> {
        let rows: Vec<PasswordReset> = self
            .tables
            .select(
                PASSWORD_RESETS_TABLE,
                &QuerySpec::new().eq("token", token).limit(1),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Marks a token as redeemed.
    pub async fn mark_used(&self, id: &RecordId) -> Result<(), ClientError> {
        self.tables
            .update::<_, PasswordReset>(
                PASSWORD_RESETS_TABLE,
                &Filters::new().eq("id", id),
                &MarkUsed { used: true },
            )
            .await?;
        Ok(())
    }
}
