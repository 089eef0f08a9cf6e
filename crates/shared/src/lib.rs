//! Shared errors, configuration, and transactional email for Voice Anchors.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - The transactional email service

pub mod config;
pub mod email;
pub mod error;

pub use config::{
    AppConfig, BackendConfig, BackendProvider, EmailConfig, EmailProviderKind, ServerConfig,
    SiteConfig,
};
pub use email::{EmailError, EmailReceipt, EmailService, OutgoingEmail, is_valid_email};
pub use error::AppError;
