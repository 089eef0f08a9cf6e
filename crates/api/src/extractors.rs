//! Request body helpers.

use std::collections::HashMap;

use anchors_db::MediaFile;
use anchors_shared::AppError;
use axum::extract::Multipart;

use crate::ApiError;

/// Upper bound for multipart uploads (photos and short videos).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// A multipart form with at most one file part.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<MediaFile>,
}

impl UploadForm {
    /// Drains a multipart body. The part named `file` becomes the upload,
    /// every other part is read as text.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(invalid_body)?;
                form.file = Some(MediaFile {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = field.text().await.map_err(invalid_body)?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// A text field, if sent and not blank.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Takes the uploaded file, failing if none was sent.
    pub fn take_file(&mut self) -> Result<MediaFile, ApiError> {
        self.file
            .take()
            .filter(|file| !file.bytes.is_empty())
            .ok_or_else(|| ApiError(AppError::Validation("Please select a file to upload".to_string())))
    }
}

#[allow(clippy::needless_pass_by_value)]
fn invalid_body(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(AppError::Validation(format!("Invalid upload: {}", err.body_text())))
}
