//! Row identifiers as handed out by the hosted backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Primary key of a backend row.
///
/// Tables may use integer or text (uuid) keys; both round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer key (`bigint`/`serial`).
    Int(i64),
    /// Text key (`uuid`/`text`).
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Int)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_and_text() {
        assert_eq!(RecordId::from("42"), RecordId::Int(42));
        assert_eq!(
            RecordId::from("5f0c2c8e-6f5e-4d2a-9d55-0f3b1b1a2c3d"),
            RecordId::Text("5f0c2c8e-6f5e-4d2a-9d55-0f3b1b1a2c3d".to_string())
        );
    }

    #[test]
    fn test_deserialize_untagged() {
        let int: RecordId = serde_json::from_str("7").unwrap();
        let text: RecordId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(int.to_string(), "7");
        assert_eq!(text.to_string(), "abc");
    }
}
