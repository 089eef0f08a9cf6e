//! Auth header construction for outgoing provider calls.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::session::Session;

/// Header carrying the static project key.
pub const API_KEY_HEADER: &str = "apikey";

/// How a session token relates to the provider's static key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// The bearer token stands in for the key; no `apikey` header is sent.
    Replace,
    /// `apikey` is always sent and the bearer is added on top.
    Layered,
}

/// Builds the header set for each request. Never fails.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    mode: KeyMode,
    api_key: Option<String>,
    service_key: Option<String>,
    defaults: HeaderMap,
}

impl RequestSigner {
    /// Creates a signer. Empty keys are treated as absent.
    #[must_use]
    pub fn new(mode: KeyMode, api_key: Option<String>, service_key: Option<String>) -> Self {
        Self {
            mode,
            api_key: api_key.filter(|k| !k.is_empty()),
            service_key: service_key.filter(|k| !k.is_empty()),
            defaults: HeaderMap::new(),
        }
    }

    /// Adds a header sent with every request, e.g. `Prefer`.
    #[must_use]
    pub fn with_default_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.defaults.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
        self
    }

    /// Key mode in effect.
    #[must_use]
    pub const fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Headers for one call: JSON content type, provider defaults, keys and
    /// bearer, then `overrides` on top.
    #[must_use]
    pub fn sign(&self, session: Option<&Session>, overrides: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(self.defaults.clone());

        let token = session.and_then(Session::token);
        let bearer = match self.mode {
            KeyMode::Replace => token.or(self.api_key.as_deref()),
            KeyMode::Layered => {
                if let Some(key) = &self.api_key {
                    insert_sensitive(&mut headers, HeaderName::from_static(API_KEY_HEADER), key);
                }
                token
                    .or(self.service_key.as_deref())
                    .or(self.api_key.as_deref())
            }
        };
        if let Some(bearer) = bearer {
            insert_sensitive(&mut headers, AUTHORIZATION, &format!("Bearer {bearer}"));
        }

        for (name, value) in overrides {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }
}

fn insert_sensitive(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(name, value);
        }
        Err(err) => warn!(header = %name, error = %err, "skipping unencodable header value"),
    }
}
