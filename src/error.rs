//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Bad credentials, missing or revoked tokens
/// - **Resource Errors**: Requested users or attractions not found
/// - **Validation Errors**: Invalid request data or weak passwords
/// - **Internal Errors**: Token signing or password hashing failures
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Signing a token failed.
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing or a blocking task failed.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Username/password pair did not match.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No valid session token accompanied a protected request.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Unauthorized")]
    Unauthorized,

    /// Current password check failed on `PUT /api/users/{id}/password`.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// Current password check failed on `POST /user/change-password`.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Incorrect current password")]
    PasswordChangeForbidden,

    #[error("User not found")]
    UserNotFound,

    /// `PUT /users/{id}` matched no row.
    #[error("User not found or no changes made")]
    UserNotUpdated,

    #[error("Attraction not found.")]
    AttractionNotFound,

    #[error("Google access token not found")]
    GoogleTokenNotFound,

    /// Username or email collides with another account.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Username or email already in use")]
    UserConflict,

    /// New password does not satisfy the strength policy.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    WeakPassword(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

// Extractor rejections keep axum's explanation but use our envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidCredentials`, `Unauthorized`, `IncorrectPassword` → 401 Unauthorized
/// - `PasswordChangeForbidden` → 403 Forbidden
/// - `UserNotFound`, `UserNotUpdated`, `AttractionNotFound`, `GoogleTokenNotFound` → 404 Not Found
/// - `UserConflict` → 409 Conflict
/// - `WeakPassword`, `InvalidRequest` → 400 Bad Request
/// - `Database`, `Token`, `Internal` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            AppError::IncorrectPassword => (
                StatusCode::UNAUTHORIZED,
                "incorrect_password",
                self.to_string(),
            ),
            AppError::PasswordChangeForbidden => (
                StatusCode::FORBIDDEN,
                "incorrect_password",
                self.to_string(),
            ),
            AppError::UserNotFound | AppError::UserNotUpdated => {
                (StatusCode::NOT_FOUND, "user_not_found", self.to_string())
            }
            AppError::AttractionNotFound => (
                StatusCode::NOT_FOUND,
                "attraction_not_found",
                self.to_string(),
            ),
            AppError::GoogleTokenNotFound => (
                StatusCode::NOT_FOUND,
                "google_token_not_found",
                self.to_string(),
            ),
            AppError::UserConflict => (StatusCode::CONFLICT, "user_conflict", self.to_string()),
            AppError::WeakPassword(ref msg) => {
                (StatusCode::BAD_REQUEST, "weak_password", msg.clone())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) | AppError::Token(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn hides_database_details() {
        let (status, body) = body_json(AppError::Database(sqlx::Error::RowNotFound)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn password_checks_use_distinct_statuses() {
        let (status, _) = body_json(AppError::IncorrectPassword).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = body_json(AppError::PasswordChangeForbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Incorrect current password");
    }

    #[tokio::test]
    async fn invalid_request_carries_message() {
        let (status, body) =
            body_json(AppError::InvalidRequest("Invalid sort order.".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid sort order.");
    }
}
