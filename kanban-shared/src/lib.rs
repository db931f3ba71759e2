//! # Kanban Shared Library
//!
//! Core of the Kanban backend, used by both the API server and the auth
//! service.
//!
//! ## Module Organization
//!
//! - `ids`: typed resource identifiers and [`ids::ResourceRef`]
//! - `models`: database models and their queries
//! - `access`: roles, the role resolver and the permission gate
//! - `ordering`: dense column and card ordering
//! - `session`: session registry and its stores
//! - `auth`: password hashing
//! - `db`: connection pool and migrations
//! - `redis`: Redis client
//! - `error`: the shared [`error::CoreError`]

pub mod access;
pub mod auth;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod ordering;
pub mod redis;
pub mod session;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
