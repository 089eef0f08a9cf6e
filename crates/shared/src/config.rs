//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Hosted backend (table + storage API) configuration.
    pub backend: BackendConfig,
    /// Transactional email configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Site-level settings.
    #[serde(default)]
    pub site: SiteConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Which hosted backend implementation serves the table and storage APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Forge BaaS (`/api/database`, bearer-only auth).
    Forge,
    /// Supabase (`/rest/v1`, `apikey` header plus bearer).
    #[default]
    Supabase,
}

impl BackendProvider {
    /// Short provider name, used to namespace persisted session keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forge => "forge",
            Self::Supabase => "supabase",
        }
    }
}

/// Hosted backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Provider selection.
    #[serde(default)]
    pub provider: BackendProvider,
    /// Base URL of the provider, e.g. `https://project.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Elevated service-role key used when no session token is present.
    #[serde(default)]
    pub service_key: Option<String>,
    /// Overrides the provider's table path prefix.
    #[serde(default)]
    pub table_prefix: Option<String>,
    /// Directory for persisted sessions; in-memory when unset.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

/// Which transport delivers transactional email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderKind {
    /// Resend HTTP API.
    Resend,
    /// SMTP relay.
    Smtp,
    /// Log messages instead of delivering them (development).
    #[default]
    Log,
}

/// Email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Delivery transport.
    #[serde(default)]
    pub provider: EmailProviderKind,
    /// Sender address. Required by the Resend and SMTP transports.
    #[serde(default)]
    pub from_email: Option<String>,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Optional reply-to address.
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Resend API key.
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// Resend API base URL.
    #[serde(default = "default_resend_base_url")]
    pub resend_base_url: String,
    /// SMTP host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Use TLS for SMTP. Disable only for local catch-all servers.
    #[serde(default = "default_smtp_tls")]
    pub smtp_tls: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProviderKind::default(),
            from_email: None,
            from_name: default_from_name(),
            reply_to: None,
            resend_api_key: None,
            resend_base_url: default_resend_base_url(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_tls: default_smtp_tls(),
        }
    }
}

fn default_from_name() -> String {
    "Voice Anchors".to_string()
}

fn default_resend_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_smtp_tls() -> bool {
    true
}

/// Site-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Public URL of the web front end, used in email links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Admin username. Admin routes are closed when unset.
    #[serde(default)]
    pub admin_username: Option<String>,
    /// Admin password, compared in plaintext.
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
            admin_username: None,
            admin_password: None,
        }
    }
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Environment variables use the `ANCHORS` prefix and `__` as the
    /// section separator, e.g. `ANCHORS__BACKEND__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("ANCHORS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("ANCHORS__BACKEND__BASE_URL", Some("https://demo.supabase.co")),
                ("ANCHORS__BACKEND__PROVIDER", Some("supabase")),
                ("ANCHORS__BACKEND__API_KEY", Some("anon-key")),
                ("ANCHORS__SERVER__PORT", Some("8088")),
                ("ANCHORS__EMAIL__PROVIDER", Some("resend")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.backend.base_url, "https://demo.supabase.co");
                assert_eq!(config.backend.provider, BackendProvider::Supabase);
                assert_eq!(config.backend.api_key.as_deref(), Some("anon-key"));
                assert_eq!(config.server.port, 8088);
                assert_eq!(config.email.provider, EmailProviderKind::Resend);
                assert_eq!(config.email.from_name, "Voice Anchors");
            },
        );
    }

    #[test]
    fn test_load_requires_backend_base_url() {
        temp_env::with_vars_unset(["ANCHORS__BACKEND__BASE_URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 3000);
        let email = EmailConfig::default();
        assert_eq!(email.provider, EmailProviderKind::Log);
        assert_eq!(email.smtp_port, 1025);
        assert!(SiteConfig::default().admin_username.is_none());
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(BackendProvider::Forge.name(), "forge");
        assert_eq!(BackendProvider::Supabase.name(), "supabase");
    }
}
