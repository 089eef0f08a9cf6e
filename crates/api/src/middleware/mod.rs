//! Request authentication.

pub mod auth;

pub use auth::{AdminUser, MemberUser};
