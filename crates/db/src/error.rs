//! Errors surfaced by the table and storage clients.

use anchors_shared::AppError;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single adapter call.
///
/// Every public client operation returns this instead of panicking; the
/// variants separate "the provider rejected the request" from "the provider
/// could not be reached" from "the provider answered with something we
/// could not read".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Non-2xx response.
    #[error("{message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Message taken from the provider's error body.
        message: String,
    },

    /// Transport failure: DNS, refused connection, timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body present but not the expected structured data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The request itself could not be encoded; nothing was sent.
    #[error("Encode error: {0}")]
    Encode(String),

    /// An endpoint or public URL could not be constructed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Update or delete without filters and without an explicit match-all.
    #[error("Refusing to {verb} every row of '{table}': no filters given")]
    UnboundedMutation {
        /// `update` or `delete`.
        verb: &'static str,
        /// Target table.
        table: String,
    },
}

impl ClientError {
    /// Builds a [`ClientError::RequestFailed`] from a table API error body.
    ///
    /// Tries `message`, then `error`, then `hint`; falls back to
    /// `Request failed: <status>` when the body is empty or not JSON.
    #[must_use]
    pub fn request_failed(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| first_message(&json, &["message", "error", "hint"]))
            .unwrap_or_else(|| format!("Request failed: {status}"));
        Self::RequestFailed { status, message }
    }

    /// Builds a [`ClientError::RequestFailed`] from a storage API error body.
    ///
    /// Tries JSON `message` / `error`, then the raw text, then
    /// `Upload failed with status <status>`.
    #[must_use]
    pub fn upload_failed(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let message = match serde_json::from_str::<Value>(trimmed) {
            Ok(json) => first_message(&json, &["message", "error"]),
            Err(_) if !trimmed.is_empty() => Some(trimmed.to_string()),
            Err(_) => None,
        }
        .unwrap_or_else(|| format!("Upload failed with status {status}"));
        Self::RequestFailed { status, message }
    }

    /// Wraps a transport error from the HTTP client.
    #[must_use]
    pub fn network(err: &reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    /// Stable name of the failure class.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RequestFailed { .. } => "RequestFailed",
            Self::Network(_) => "NetworkError",
            Self::Parse(_) => "ParseError",
            Self::Encode(_) => "EncodeError",
            Self::InvalidUrl(_) => "InvalidUrl",
            Self::UnboundedMutation { .. } => "UnboundedMutation",
        }
    }

    /// Provider status code, when the provider answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message, without the class prefix for provider errors.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::RequestFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn first_message(json: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        json.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match &err {
            ClientError::RequestFailed { status: 404, .. } => Self::NotFound(err.message()),
            ClientError::RequestFailed { status: 409, .. } => Self::Conflict(err.message()),
            ClientError::RequestFailed { .. }
            | ClientError::Network(_)
            | ClientError::Parse(_) => Self::Backend(err.message()),
            ClientError::Encode(_)
            | ClientError::InvalidUrl(_)
            | ClientError::UnboundedMutation { .. } => {
                Self::Internal(err.message())
            }
        }
    }
}
