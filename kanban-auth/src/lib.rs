//! # Kanban Auth Service
//!
//! Owns passwords and sessions for the board API. The API never sees a
//! password hash; it asks this service over four JSON operations instead.
//!
//! ## Modules
//!
//! - `credentials`: where password hashes live (Postgres, or memory in tests)
//! - `service`: the four operations over credentials and sessions
//! - `rpc`: HTTP routing and protocol statuses
//! - `health`: database and Redis reachability
//! - `config`: environment configuration

pub mod config;
pub mod credentials;
pub mod health;
pub mod rpc;
pub mod service;
