//! # RentEase Shared Library
//!
//! Domain types, storage and business services used by the RentEase API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: users, roles and landlord memberships
//! - `store`: the `UserStore` trait with Postgres and in-memory backends
//! - `db`: Postgres pool and migrations
//! - `auth`: password hashing, session tokens, reset tokens, role guard
//! - `credentials`: role-aware user persistence (Credential Store)
//! - `identity`: registration, login, password reset, settings
//! - `relationships`: landlord to tenant listings
//! - `notifications`: real-time payment broadcasts
//! - `error`: service error type

pub mod auth;
pub mod credentials;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod notifications;
pub mod relationships;
pub mod store;

/// Current version of the RentEase shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
