/// Error type shared by every core component
///
/// The kinds are deliberately flat: delivery layers map them one-to-one onto
/// status codes (`NotFound` → 404, `NotPermitted` → 403, `Validation` → 400,
/// `AlreadyExists` → 409, `WrongCredentials` → 401, the rest → 500).

use crate::auth::password::PasswordError;
use crate::redis::RedisClientError;

/// Result alias used throughout the core
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error kinds
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Resource or membership row is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Role insufficient or dominance rule violated
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// Unique row already present
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Malformed anchors, role strings, ids, cross-board moves
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Session or password mismatch
    #[error("Wrong credentials")]
    WrongCredentials,

    /// Relational store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Key-value store failure
    #[error("Cache error: {0}")]
    Cache(#[from] RedisClientError),

    /// Password hashing failure
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

impl CoreError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        CoreError::NotFound(what.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_permitted(msg: impl Into<String>) -> Self {
        CoreError::NotPermitted(msg.into())
    }
}

impl From<redis::RedisError> for CoreError {
    fn from(err: redis::RedisError) -> Self {
        CoreError::Cache(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::not_found("card_3");
        assert_eq!(err.to_string(), "Not found: card_3");

        let err = CoreError::validation("anchors are not adjacent");
        assert!(err.to_string().contains("anchors are not adjacent"));
    }
}
