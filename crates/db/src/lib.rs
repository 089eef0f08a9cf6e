//! Data-access adapter for the hosted backend.
//!
//! This crate provides:
//! - [`TableClient`]: typed CRUD over a PostgREST-style table API
//! - [`StorageClient`]: object uploads and public URLs
//! - [`SessionStore`]: the persisted access token used to sign requests
//! - Typed repositories for members, applications, media, and password resets
//!
//! The active provider is picked once, from configuration, by
//! [`Backend::connect`]; callers never see which one it is.

pub mod client;
pub mod envelope;
pub mod error;
pub mod provider;
pub mod query;
pub mod repositories;
pub mod session;
pub mod signer;
pub mod storage;

use std::sync::Arc;

use anchors_shared::{BackendConfig, BackendProvider};
use tracing::info;
use url::Url;

pub use client::{Records, TableClient};
pub use envelope::{Envelope, EnvelopeError};
pub use error::ClientError;
pub use provider::{ProviderProfile, UploadEncoding};
pub use query::{BuiltQuery, FilterOp, FilterValue, Filters, QueryBuilder, QuerySpec};
pub use repositories::{
    ApplicationRepository, MediaFile, MediaRepository, MemberRepository, PasswordResetRepository,
    RepositoryError,
};
pub use session::{FileSessionBackend, MemorySessionBackend, Session, SessionBackend, SessionStore};
pub use signer::{KeyMode, RequestSigner};
pub use storage::{Blob, StorageClient, UploadResult};

use client::Connection;

/// Handles for one configured provider.
#[derive(Debug, Clone)]
pub struct Backend {
    provider: BackendProvider,
    tables: TableClient,
    storage: StorageClient,
    sessions: SessionStore,
}

impl Backend {
    /// Builds clients for the configured provider.
    ///
    /// Sessions persist to `session_dir` when set, otherwise in memory.
    pub fn connect(config: &BackendConfig) -> Result<Self, ClientError> {
        let session_backend: Arc<dyn SessionBackend> = match &config.session_dir {
            Some(dir) => Arc::new(FileSessionBackend::new(dir)),
            None => Arc::new(MemorySessionBackend::new()),
        };
        Self::with_session_backend(config, session_backend)
    }

    /// Builds clients with an explicit session backend.
    pub fn with_session_backend(
        config: &BackendConfig,
        session_backend: Arc<dyn SessionBackend>,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url} is not an http(s) URL"
            )));
        }

        let provider = config.provider;
        let profile = ProviderProfile::new(provider, config.table_prefix.as_deref());
        let mut signer = RequestSigner::new(
            profile.key_mode(),
            config.api_key.clone(),
            config.service_key.clone(),
        );
        if profile.wants_representation() {
            signer = signer.with_default_header("prefer", "return=representation");
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("anchors/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ClientError::Network(format!("failed to build HTTP client: {err}")))?;

        let sessions = SessionStore::new(provider.name(), session_backend);
        let conn = Arc::new(Connection {
            http,
            base_url,
            queries: QueryBuilder::new(profile.table_prefix()),
            profile,
            signer,
            sessions: sessions.clone(),
        });

        info!(provider = provider.name(), base_url = %conn.base_url, "backend adapter ready");
        Ok(Self {
            provider,
            tables: TableClient::new(Arc::clone(&conn)),
            storage: StorageClient::new(conn),
            sessions,
        })
    }

    /// Active provider.
    #[must_use]
    pub const fn provider(&self) -> BackendProvider {
        self.provider
    }

    /// Table client.
    #[must_use]
    pub const fn tables(&self) -> &TableClient {
        &self.tables
    }

    /// Storage client.
    #[must_use]
    pub const fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// Session store used to sign requests.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Member repository.
    #[must_use]
    pub fn members(&self) -> MemberRepository {
        MemberRepository::new(self.tables.clone(), self.storage.clone())
    }

    /// Application repository.
    #[must_use]
    pub fn applications(&self) -> ApplicationRepository {
        ApplicationRepository::new(self.tables.clone())
    }

    /// Activity media repository.
    #[must_use]
    pub fn media(&self) -> MediaRepository {
        MediaRepository::new(self.tables.clone(), self.storage.clone())
    }

    /// Password reset repository.
    #[must_use]
    pub fn password_resets(&self) -> PasswordResetRepository {
        PasswordResetRepository::new(self.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: BackendProvider, base_url: &str) -> BackendConfig {
        BackendConfig {
            provider,
            base_url: base_url.to_string(),
            api_key: Some("anon".to_string()),
            service_key: None,
            table_prefix: None,
            session_dir: None,
        }
    }

    #[test]
    fn test_connect_rejects_bad_base_url() {
        let err = Backend::connect(&config(BackendProvider::Forge, "not a url")).unwrap_err();
        assert_eq!(err.kind(), "InvalidUrl");

        let err = Backend::connect(&config(BackendProvider::Forge, "ftp://files.example")).unwrap_err();
        assert_eq!(err.kind(), "InvalidUrl");
    }

    #[test]
    fn test_sessions_namespaced_by_provider() {
        let backend = Arc::new(MemorySessionBackend::new());
        let supabase = Backend::with_session_backend(
            &config(BackendProvider::Supabase, "https://demo.supabase.co"),
            backend.clone(),
        )
        .unwrap();
        supabase.sessions().store_session(Some(Session::with_token("t")));

        assert!(backend.read("supabase_token").is_some());
        assert!(backend.read("forge_token").is_none());
        assert_eq!(supabase.provider(), BackendProvider::Supabase);
    }

    #[test]
    fn test_public_url_without_upload() {
        let backend = Backend::connect(&config(BackendProvider::Supabase, "https://demo.supabase.co")).unwrap();
        let url = backend.storage().public_url("profile-pictures", "p.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.supabase.co/storage/v1/object/public/profile-pictures/p.png"
        );
    }
}
