//! User data models and API request/response types.
//!
//! This module defines:
//! - `UserRow`: profile row joined with the user's role names
//! - `UserCredentials`: the columns needed to check a password
//! - Request bodies for login, profile updates and password changes

use serde::{Deserialize, Serialize};

/// A user profile as read from the database.
///
/// `roles` is produced by `GROUP_CONCAT(r.name)` and is NULL for a user
/// without any role.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub google_access_token: Option<String>,
    pub google_refresh_token: Option<String>,
    pub google_token_expiry: Option<String>,
    pub roles: Option<String>,
}

/// Response body for `GET /users/{id}`.
///
/// ```json
/// {
///   "id": 1,
///   "username": "ada",
///   "email": "ada@example.com",
///   "google_access_token": null,
///   "google_refresh_token": null,
///   "google_token_expiry": null,
///   "roles": ["admin", "user"]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub google_access_token: Option<String>,
    pub google_refresh_token: Option<String>,
    pub google_token_expiry: Option<String>,
    pub roles: Vec<String>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        let roles = row
            .roles
            .map(|joined| {
                joined
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            google_access_token: row.google_access_token,
            google_refresh_token: row.google_refresh_token,
            google_token_expiry: row.google_token_expiry,
            roles,
        }
    }
}

/// The subset of a user row needed to authenticate.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,
}

/// Request body for `PUT /users/{id}`.
///
/// Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,

    /// Plaintext; validated and hashed before storage
    pub password: Option<String>,
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Request body for `PUT /api/users/{id}/password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Request body for `POST /user/change-password`.
///
/// ```json
/// {
///   "userId": 1,
///   "currentPassword": "old",
///   "newPassword": "Str0ng&Passw0rd",
///   "confirmNewPassword": "Str0ng&Passw0rd"
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub user_id: Option<i64>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
}

/// Response body for `GET /users/token`.
#[derive(Debug, Serialize)]
pub struct GoogleTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Treats `""` the same as a missing field.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(roles: Option<&str>) -> UserRow {
        UserRow {
            id: 7,
            username: "ada".into(),
            email: "ada@example.com".into(),
            google_access_token: None,
            google_refresh_token: None,
            google_token_expiry: None,
            roles: roles.map(str::to_string),
        }
    }

    #[test]
    fn splits_concatenated_roles() {
        let response = UserResponse::from(row(Some("admin,user")));
        assert_eq!(response.roles, vec!["admin", "user"]);
    }

    #[test]
    fn user_without_roles_has_empty_list() {
        let response = UserResponse::from(row(None));
        assert!(response.roles.is_empty());
    }

    #[test]
    fn change_password_request_uses_camel_case() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "userId": 3,
            "currentPassword": "a",
            "newPassword": "b",
            "confirmNewPassword": "b"
        }))
        .unwrap();

        assert_eq!(request.user_id, Some(3));
        assert_eq!(request.confirm_new_password.as_deref(), Some("b"));
    }
}
