//! `{ data, error }` wire shape for adapter results.

use serde::Serialize;

use crate::error::ClientError;

/// Serializable form of an adapter error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    /// Failure class, e.g. `RequestFailed`.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Provider status, when the provider answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&ClientError> for EnvelopeError {
    fn from(err: &ClientError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message(),
            status: err.status(),
        }
    }
}

/// Result of one adapter call, as JSON.
///
/// Built from `Result<T, ClientError>`; at most one side is populated.
/// `Ok(())` serializes as `{"data":null,"error":null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    /// Payload on success.
    pub data: Option<T>,
    /// Failure details.
    pub error: Option<EnvelopeError>,
}

impl<T> Envelope<T> {
    /// Successful envelope.
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Failed envelope.
    #[must_use]
    pub fn err(error: &ClientError) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }

    /// Whether the call failed.
    pub const fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> From<Result<T, ClientError>> for Envelope<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(&err),
        }
    }
}
