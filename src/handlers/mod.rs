//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, query, cookies)
//! 2. Validates it and runs its SQL statement(s)
//! 3. Returns HTTP response (JSON, status code)

/// Attraction CRUD and listing
pub mod attractions;
/// Login, logout and the Google token lookup
pub mod auth;
pub mod health;
/// Password change endpoints
pub mod passwords;
/// User profile endpoints
pub mod users;
