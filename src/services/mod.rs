//! Business logic services.
//!
//! Services contain the credential and token logic separated from HTTP handlers.

pub mod auth_service;
pub mod password_service;
pub mod token_service;
