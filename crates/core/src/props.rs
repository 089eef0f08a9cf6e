//! Property-based tests for membership rules.
//!
//! - Object keys never contain path separators
//! - Application handles never keep a leading `@`
//! - Reset tokens are always 64 lowercase hex characters

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use crate::application::NewApplication;
use crate::id::RecordId;
use crate::media::{media_object_key, profile_picture_key};
use crate::password_reset::generate_reset_token;

/// Strategy for arbitrary upload file names, separators included.
fn file_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._/\\\\-]{1,40}"
}

/// Strategy for millisecond timestamps within a sane range.
fn millis() -> impl Strategy<Value = i64> {
    1_000_000_000_000i64..4_000_000_000_000i64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_media_key_is_single_segment(name in file_name(), ms in millis()) {
        let now = Utc.timestamp_millis_opt(ms).unwrap();
        let key = media_object_key(&name, now);
        prop_assert!(!key.contains('/'));
        prop_assert!(!key.contains('\\'));
        let prefix = format!("{ms}-");
        prop_assert!(key.starts_with(&prefix));
    }

    #[test]
    fn prop_profile_key_is_single_segment(name in file_name(), id in any::<i64>(), ms in millis()) {
        let now = Utc.timestamp_millis_opt(ms).unwrap();
        let key = profile_picture_key(&RecordId::Int(id), &name, now);
        prop_assert!(!key.contains('/'));
        let prefix = format!("profile-{id}-{ms}.");
        prop_assert!(key.starts_with(&prefix));
    }

    #[test]
    fn prop_handle_loses_leading_at(ats in 0usize..4, handle in "[a-z0-9_.]{1,20}") {
        let raw = format!("{}{handle}", "@".repeat(ats));
        let app = NewApplication::new("fan@example.com", &raw).unwrap();
        prop_assert!(!app.tiktok_username.starts_with('@'));
        prop_assert_eq!(app.tiktok_username, handle);
    }

    #[test]
    fn prop_numeric_ids_parse_as_int(id in any::<i64>()) {
        prop_assert_eq!(RecordId::from(id.to_string().as_str()), RecordId::Int(id));
    }
}

#[test]
fn test_reset_tokens_are_lowercase_hex() {
    for _ in 0..32 {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }
}
