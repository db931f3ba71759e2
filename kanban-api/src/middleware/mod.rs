/// Middleware for the API server
///
/// - `security`: security response headers
/// - `session`: session cookie authentication

pub mod security;
pub mod session;
