//! # FamilyHub Shared Library
//!
//! Domain layer of the FamilyHub household task backend: entity models with
//! their queries, the family authorization check, the service layer and the
//! database helpers used by the API server and the seed tool.
//!
//! ## Module Organization
//!
//! - `models`: Database models and payload types
//! - `auth`: Current user and family authorization checks
//! - `services`: Multi-step operations run inside one transaction
//! - `db`: Connection pool, migrations and transaction helpers
//! - `error`: Service error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

/// Current version of the FamilyHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
