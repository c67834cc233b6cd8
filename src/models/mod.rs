//! Data models representing database entities and API payloads.

use serde::Serialize;

/// Attractions and their list/query types
pub mod attraction;
/// Users, credentials and password-change payloads
pub mod user;

/// Body returned by endpoints that only confirm an action.
///
/// ```json
/// { "message": "Attraction deleted successfully." }
/// ```
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
