//! Object storage client.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::Connection;
use crate::error::ClientError;
use crate::provider::UploadEncoding;

/// Content type used when a blob does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Bytes to upload, with optional metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

impl Blob {
    /// Wraps raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            file_name: None,
        }
    }

    /// Declares the MIME type. Empty strings are ignored.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into()).filter(|ct| !ct.is_empty());
        self
    }

    /// Original file name, used for multipart uploads.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Declared MIME type or [`DEFAULT_CONTENT_TYPE`].
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-byte blob.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Absolute, publicly fetchable URL.
    pub url: String,
    /// Object key, server-assigned when the provider chose one.
    pub key: String,
    /// Provider-reported storage path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Uploads blobs and builds their public URLs.
#[derive(Debug, Clone)]
pub struct StorageClient {
    conn: Arc<Connection>,
}

impl StorageClient {
    pub(crate) const fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }

    /// Public URL of `bucket`/`key`, without contacting the provider.
    pub fn public_url(&self, bucket: &str, key: &str) -> Result<Url, ClientError> {
        self.conn
            .profile
            .public_url(&self.conn.base_url, bucket, key)
    }

    /// Uploads `blob` to `bucket`/`key` in a single attempt.
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        blob: Blob,
    ) -> Result<UploadResult, ClientError> {
        let url = self
            .conn
            .profile
            .upload_url(&self.conn.base_url, bucket, key)?;
        let encoding = self.conn.profile.upload_encoding();
        debug!(bucket, key, bytes = blob.len(), content_type = blob.content_type(), "storage upload");

        let request = self.conn.http.post(url);
        let request = match encoding {
            UploadEncoding::Raw => {
                let mut overrides = HeaderMap::new();
                overrides.insert(CONTENT_TYPE, content_type_header(blob.content_type()));
                overrides.insert(
                    HeaderName::from_static("x-upsert"),
                    HeaderValue::from_static("true"),
                );
                request
                    .headers(self.conn.headers(&overrides))
                    .body(blob.bytes)
            }
            UploadEncoding::Multipart => {
                let mut headers = self.conn.headers(&HeaderMap::new());
                headers.remove(CONTENT_TYPE);
                request.headers(headers).multipart(multipart_form(blob, key)?)
            }
        };

        let response = request.send().await.map_err(|err| {
            warn!(bucket, key, error = %err, "storage upload did not complete");
            ClientError::network(&err)
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| {
            warn!(bucket, key, status = status.as_u16(), error = %err, "storage response body was cut off");
            ClientError::network(&err)
        })?;

        if !status.is_success() {
            let err = ClientError::upload_failed(status.as_u16(), &text);
            warn!(bucket, key, status = status.as_u16(), message = %err.message(), "storage upload rejected");
            return Err(err);
        }

        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| {
            if !text.trim().is_empty() {
                debug!(bucket, key, "storage response was not JSON");
            }
            Value::Null
        });
        let assigned_key = string_field(&body, &["key"]).unwrap_or_else(|| key.to_string());
        let path = string_field(&body, &["Key", "path"]);
        let url = self.public_url(bucket, &assigned_key)?;

        info!(bucket, key = %assigned_key, "object uploaded");
        Ok(UploadResult {
            url: url.into(),
            key: assigned_key,
            path,
        })
    }
}

fn content_type_header(content_type: &str) -> HeaderValue {
    HeaderValue::from_str(content_type).unwrap_or_else(|_| {
        warn!(content_type, "unusable content type, sending as binary");
        HeaderValue::from_static(DEFAULT_CONTENT_TYPE)
    })
}

fn multipart_form(blob: Blob, key: &str) -> Result<Form, ClientError> {
    let content_type = blob.content_type().to_string();
    let file_name = blob.file_name.unwrap_or_else(|| key.to_string());
    let part = Part::bytes(blob.bytes.to_vec())
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(|err| ClientError::Encode(format!("content type '{content_type}': {err}")))?;
    Ok(Form::new().part("file", part))
}

fn string_field(body: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
