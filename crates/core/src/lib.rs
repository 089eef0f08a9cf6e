//! Core membership logic for Voice Anchors.
//!
//! This crate contains pure domain logic with ZERO web or database dependencies.
//! Row types, validation rules, and the application review workflow live here.
//!
//! # Modules
//!
//! - `member` - Member rows, directory profiles, and profile edits
//! - `application` - Membership applications and admin review
//! - `media` - Activity media and storage key conventions
//! - `password_reset` - Reset tokens and password rules
//! - `auth` - Admin and member sign-in checks

pub mod application;
pub mod auth;
pub mod error;
pub mod id;
pub mod media;
pub mod member;
pub mod password_reset;

#[cfg(test)]
mod props;

pub use error::MembershipError;
pub use id::RecordId;
