//! Per-provider routing and auth conventions.

use anchors_shared::BackendProvider;
use url::Url;

use crate::error::ClientError;
use crate::signer::KeyMode;

/// How the storage API expects the object body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEncoding {
    /// `multipart/form-data` with a single `file` field.
    Multipart,
    /// Raw bytes with the object's own content type.
    Raw,
}

/// Everything that differs between the supported providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    provider: BackendProvider,
    table_prefix: String,
}

impl ProviderProfile {
    /// Profile for `provider`, optionally overriding its table prefix.
    #[must_use]
    pub fn new(provider: BackendProvider, table_prefix: Option<&str>) -> Self {
        let table_prefix = table_prefix
            .map_or_else(|| Self::default_table_prefix(provider).to_string(), str::to_string);
        Self {
            provider,
            table_prefix,
        }
    }

    const fn default_table_prefix(provider: BackendProvider) -> &'static str {
        match provider {
            BackendProvider::Forge => "/api/database",
            BackendProvider::Supabase => "/rest/v1",
        }
    }

    /// Which provider this is.
    #[must_use]
    pub const fn provider(&self) -> BackendProvider {
        self.provider
    }

    /// Path prefix in front of table names.
    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Whether the bearer token replaces or layers on the static key.
    #[must_use]
    pub const fn key_mode(&self) -> KeyMode {
        match self.provider {
            BackendProvider::Forge => KeyMode::Replace,
            BackendProvider::Supabase => KeyMode::Layered,
        }
    }

    /// Whether writes must ask for the affected rows back.
    #[must_use]
    pub const fn wants_representation(&self) -> bool {
        matches!(self.provider, BackendProvider::Supabase)
    }

    /// Body encoding for uploads.
    #[must_use]
    pub const fn upload_encoding(&self) -> UploadEncoding {
        match self.provider {
            BackendProvider::Forge => UploadEncoding::Multipart,
            BackendProvider::Supabase => UploadEncoding::Raw,
        }
    }

    /// Upload endpoint for `bucket`/`key`.
    pub fn upload_url(&self, base: &Url, bucket: &str, key: &str) -> Result<Url, ClientError> {
        match self.provider {
            BackendProvider::Forge => {
                with_segments(base, &["api", "storage", "buckets", bucket, "objects", key])
            }
            BackendProvider::Supabase => {
                with_segments(base, &["storage", "v1", "object", bucket, key])
            }
        }
    }

    /// Public read URL for `bucket`/`key`.
    pub fn public_url(&self, base: &Url, bucket: &str, key: &str) -> Result<Url, ClientError> {
        let url = match self.provider {
            BackendProvider::Forge => self.upload_url(base, bucket, key)?,
            BackendProvider::Supabase => {
                with_segments(base, &["storage", "v1", "object", "public", bucket, key])?
            }
        };
        ensure_absolute(url)
    }
}

/// Appends percent-encoded path segments to `base`.
fn with_segments(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidUrl(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn ensure_absolute(url: Url) -> Result<Url, ClientError> {
    if matches!(url.scheme(), "http" | "https") && url.host().is_some() {
        Ok(url)
    } else {
        Err(ClientError::InvalidUrl(format!(
            "{url} is not an absolute http(s) URL"
        )))
    }
}
