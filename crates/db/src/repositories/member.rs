//! Member repository.

use anchors_core::RecordId;
use anchors_core::auth::authenticate_member;
use anchors_core::media::{PROFILE_PICTURE_BUCKET, profile_picture_key};
use anchors_core::member::{
    MEMBER_DIRECTORY_ORDER, MEMBERS_TABLE, Member, MemberProfile, NewMember, PasswordPatch,
    ProfileUpdate,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::RepositoryError;
use crate::client::TableClient;
use crate::error::ClientError;
use crate::query::{Filters, QuerySpec};
use crate::storage::{Blob, StorageClient, UploadResult};

/// Member repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    tables: TableClient,
    storage: StorageClient,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(tables: TableClient, storage: StorageClient) -> Self {
        Self { tables, storage }
    }

    /// All members, newest first.
    pub async fn list(&self) -> Result<Vec<Member>, ClientError> {
        self.tables
            .select(
                MEMBERS_TABLE,
                &QuerySpec::new().select("*").order(MEMBER_DIRECTORY_ORDER),
            )
            .await
    }

    /// Public directory entries, newest first.
    pub async fn directory(&self) -> Result<Vec<MemberProfile>, ClientError> {
        Ok(self.list().await?.iter().map(Member::profile).collect())
    }

    /// Finds a member by id.
    pub async fn find_by_id(&self, id: &RecordId) -> Result<Option<Member>, ClientError> {
        self.find_one("id", id.to_string()).await
    }

    /// Finds a member by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Member>, ClientError> {
        self.find_one("username", username).await
    }

    /// Finds a member by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Member>, ClientError> {
        self.find_one("email", email).await
    }

    async fn find_one(
        &self,
        column: &str,
        value: impl ToString,
    ) -> Result<Option<Member>, ClientError> {
        let rows: Vec<Member> = self
            .tables
            .select(MEMBERS_TABLE, &QuerySpec::new().eq(column, value).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Creates a member after checking username and email are free.
    pub async fn create(&self, member: &NewMember) -> Result<Member, RepositoryError> {
        if self.find_by_username(&member.username).await?.is_some() {
            return Err(RepositoryError::Duplicate("Username already exists".to_string()));
        }
        if self.find_by_email(&member.email).await?.is_some() {
            return Err(RepositoryError::Duplicate("Email already exists".to_string()));
        }

        let created: Member = self.tables.insert_one(MEMBERS_TABLE, member).await?;
        info!(member_id = %created.id, username = %created.username, "member created");
        Ok(created)
    }

    /// Signs a member in by plaintext username/password comparison.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Member, RepositoryError> {
        let candidates: Vec<Member> = self
            .tables
            .select(MEMBERS_TABLE, &QuerySpec::new().eq("username", username))
            .await?;
        Ok(authenticate_member(&candidates, username, password)?.clone())
    }

    /// Applies a profile edit and returns the updated member.
    pub async fn update_profile(
        &self,
        id: &RecordId,
        update: ProfileUpdate,
    ) -> Result<Member, RepositoryError> {
        let update = update.normalized()?;
        let rows: Option<Vec<Member>> = self
            .tables
            .update(MEMBERS_TABLE, &by_id(id), &update)
            .await?;

        let member = match rows {
            Some(rows) => rows.into_iter().next(),
            None => self.find_by_id(id).await?,
        };
        member.ok_or_else(|| RepositoryError::NotFound(format!("Member {id}")))
    }

    /// Replaces a member's password.
    pub async fn set_password(&self, id: &RecordId, password: &str) -> Result<(), ClientError> {
        let patch = PasswordPatch {
            password: password.to_string(),
        };
        self.tables
            .update::<_, Member>(MEMBERS_TABLE, &by_id(id), &patch)
            .await?;
        info!(member_id = %id, "member password changed");
        Ok(())
    }

    /// Deletes a member. Deleting a missing member succeeds.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ClientError> {
        self.tables.delete(MEMBERS_TABLE, &by_id(id)).await?;
        info!(member_id = %id, "member deleted");
        Ok(())
    }

    /// Uploads a profile picture and returns where it is served from.
    pub async fn upload_profile_picture(
        &self,
        id: &RecordId,
        file_name: &str,
        blob: Blob,
        now: DateTime<Utc>,
    ) -> Result<UploadResult, ClientError> {
        let key = profile_picture_key(id, file_name, now);
        self.storage
            .upload(PROFILE_PICTURE_BUCKET, &key, blob.with_file_name(file_name))
            .await
    }
}

fn by_id(id: &RecordId) -> Filters {
    Filters::new().eq("id", id)
}
