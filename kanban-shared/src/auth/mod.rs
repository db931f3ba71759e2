//! Authentication building blocks
//!
//! - `password`: Argon2id hashing and strength rules
//! - `protocol`: request and response types of the auth service

pub mod password;
pub mod protocol;
