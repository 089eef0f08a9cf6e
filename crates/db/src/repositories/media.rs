//! Activity media repository.

use anchors_core::{MembershipError, RecordId};
use anchors_core::media::{
    ACTIVITY_ORDER, MEDIA_BUCKET, MEDIA_TABLE, MediaKind, MediaUpload, NewMediaUpload,
    media_object_key,
};
use chrono::{DateTime, Utc};
use tracing::info;

use super::RepositoryError;
use crate::client::TableClient;
use crate::error::ClientError;
use crate::query::{Filters, QuerySpec};
use crate::storage::{Blob, StorageClient, UploadResult};

/// A file offered for the activities feed.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: bytes::Bytes,
}

/// Activity media repository.
#[derive(Debug, Clone)]
pub struct MediaRepository {
    tables: TableClient,
    storage: StorageClient,
}

impl MediaRepository {
    /// Creates a new media repository.
    #[must_use]
    pub const fn new(tables: TableClient, storage: StorageClient) -> Self {
        Self { tables, storage }
    }

    /// Activities feed, newest first.
    pub async fn list(&self) -> Result<Vec<MediaUpload>, ClientError> {
        self.tables
            .select(MEDIA_TABLE, &QuerySpec::new().select("*").order(ACTIVITY_ORDER))
            .await
    }

    /// Records an already uploaded object.
    pub async fn create(&self, media: &NewMediaUpload) -> Result<MediaUpload, ClientError> {
        self.tables.insert_one(MEDIA_TABLE, media).await
    }

    /// Deletes a media row. The stored object is left in place.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ClientError> {
        self.tables
            .delete(MEDIA_TABLE, &Filters::new().eq("id", id))
            .await?;
        info!(media_id = %id, "media deleted");
        Ok(())
    }

    /// Uploads a file into the media bucket under a timestamped key.
    pub async fn upload(
        &self,
        file_name: &str,
        blob: Blob,
        now: DateTime<Utc>,
    ) -> Result<UploadResult, ClientError> {
        let key = media_object_key(file_name, now);
        self.storage
            .upload(MEDIA_BUCKET, &key, blob.with_file_name(file_name))
            .await
    }

    /// Uploads a photo or video and adds it to the activities feed.
    ///
    /// Non-media files are rejected before anything is uploaded.
    pub async fn publish(
        &self,
        title: &str,
        description: Option<&str>,
        file: MediaFile,
        now: DateTime<Utc>,
    ) -> Result<MediaUpload, RepositoryError> {
        let kind = MediaKind::from_content_type(&file.content_type)?;
        if title.trim().is_empty() {
            return Err(MembershipError::Validation("title is required".to_string()).into());
        }

        let blob = Blob::new(file.bytes).with_content_type(file.content_type);
        let uploaded = self.upload(&file.file_name, blob, now).await?;
        let media = NewMediaUpload::new(title, description, uploaded.url, kind)?;
        let created = self.create(&media).await?;
        info!(media_id = %created.id, key = %uploaded.key, kind = ?kind, "activity published");
        Ok(created)
    }
}
