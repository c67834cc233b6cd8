//! Password change HTTP handlers.
//!
//! Two endpoints exist for historical clients and differ only in request
//! shape and in the status returned for a wrong current password:
//! - PUT /api/users/{id}/password → 401
//! - POST /user/change-password → 403

use axum::{Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    extract::{JsonBody, PathParam},
    models::{
        MessageResponse,
        user::{ChangePasswordRequest, UpdatePasswordRequest, non_empty},
    },
    services::password_service,
};

/// Replace the password of `user_id` after checking `current_password`.
///
/// `mismatch` is the error reported when the current password is wrong.
async fn replace_password(
    pool: &DbPool,
    user_id: i64,
    current_password: String,
    new_password: String,
    mismatch: AppError,
) -> Result<(), AppError> {
    let stored_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if !password_service::verify_password(current_password, stored_hash).await? {
        return Err(mismatch);
    }

    password_service::validate_password_strength(&new_password)?;
    let new_hash = password_service::hash_password(new_password).await?;

    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(new_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    tracing::info!(user_id, "password changed");

    Ok(())
}

/// Update a user's password.
///
/// # Request Body
///
/// ```json
/// { "currentPassword": "...", "newPassword": "..." }
/// ```
///
/// # Errors
///
/// - 400: missing field or weak new password
/// - 404: user not found
/// - 401: current password is incorrect
pub async fn update_password(
    State(pool): State<DbPool>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (Some(current), Some(new)) = (
        non_empty(request.current_password),
        non_empty(request.new_password),
    ) else {
        return Err(AppError::InvalidRequest("Missing required fields".to_string()));
    };

    replace_password(&pool, user_id, current, new, AppError::IncorrectPassword).await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Change a user's password with confirmation.
///
/// # Request Body
///
/// ```json
/// {
///   "userId": 1,
///   "currentPassword": "...",
///   "newPassword": "...",
///   "confirmNewPassword": "..."
/// }
/// ```
///
/// # Errors
///
/// - 400: missing field, confirmation mismatch or weak new password
/// - 404: user not found
/// - 403: current password is incorrect
pub async fn change_password(
    State(pool): State<DbPool>,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (Some(user_id), Some(current), Some(new), Some(confirm)) = (
        request.user_id,
        non_empty(request.current_password),
        non_empty(request.new_password),
        non_empty(request.confirm_new_password),
    ) else {
        return Err(AppError::InvalidRequest("Missing required fields".to_string()));
    };

    if new != confirm {
        return Err(AppError::InvalidRequest(
            "New passwords do not match".to_string(),
        ));
    }

    // Policy is checked before touching the database
    password_service::validate_password_strength(&new)?;

    replace_password(&pool, user_id, current, new, AppError::PasswordChangeForbidden).await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::{
        routes::test_support::TestApp,
        services::auth_service::{
            self,
            fixtures::{PASSWORD, create_user},
        },
    };

    const NEW_PASSWORD: &str = "Passport#2025x";

    #[tokio::test]
    async fn update_password_then_login_with_new_one() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::PUT,
                &format!("/api/users/{id}/password"),
                json!({ "currentPassword": PASSWORD, "newPassword": NEW_PASSWORD }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password updated successfully");
        assert!(
            auth_service::verify_user(&app.state.pool, "ada", NEW_PASSWORD)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn update_password_with_wrong_current_is_401() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::PUT,
                &format!("/api/users/{id}/password"),
                json!({ "currentPassword": "Not-the-one-1!", "newPassword": NEW_PASSWORD }),
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Current password is incorrect");
    }

    #[tokio::test]
    async fn update_password_missing_fields_is_400() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::PUT,
                &format!("/api/users/{id}/password"),
                json!({ "currentPassword": PASSWORD }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing required fields");
    }

    #[tokio::test]
    async fn update_password_unknown_user_is_404() {
        let app = TestApp::new().await;

        let (status, _) = app
            .send_json(
                Method::PUT,
                "/api/users/77/password",
                json!({ "currentPassword": PASSWORD, "newPassword": NEW_PASSWORD }),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn change_password_succeeds() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::POST,
                "/user/change-password",
                json!({
                    "userId": id,
                    "currentPassword": PASSWORD,
                    "newPassword": NEW_PASSWORD,
                    "confirmNewPassword": NEW_PASSWORD
                }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password changed successfully");
    }

    #[tokio::test]
    async fn change_password_confirmation_mismatch_is_400() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::POST,
                "/user/change-password",
                json!({
                    "userId": id,
                    "currentPassword": PASSWORD,
                    "newPassword": NEW_PASSWORD,
                    "confirmNewPassword": "Something&Else1"
                }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "New passwords do not match");
    }

    #[tokio::test]
    async fn change_password_wrong_current_is_403() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, _) = app
            .send_json(
                Method::POST,
                "/user/change-password",
                json!({
                    "userId": id,
                    "currentPassword": "Not-the-one-1!",
                    "newPassword": NEW_PASSWORD,
                    "confirmNewPassword": NEW_PASSWORD
                }),
            )
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn change_password_weak_is_400() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::POST,
                "/user/change-password",
                json!({
                    "userId": id,
                    "currentPassword": PASSWORD,
                    "newPassword": "weakpass",
                    "confirmNewPassword": "weakpass"
                }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "weak_password");
    }
}
