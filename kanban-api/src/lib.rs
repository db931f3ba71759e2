//! # Kanban API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `auth_client`: Client for the auth service
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors with JSON rejections
//! - `middleware`: Session authentication and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod auth_client;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
