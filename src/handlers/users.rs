//! User profile HTTP handlers.
//!
//! - GET /users/{id} - Profile with role names
//! - PUT /users/{id} - Partial update
//! - DELETE /users/{id} - Remove user (cascades to roles and tokens)

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    extract::{JsonBody, PathParam},
    models::{
        MessageResponse,
        user::{UpdateUserRequest, UserResponse, UserRow, non_empty},
    },
    services::password_service,
};

/// Get a user with their roles.
///
/// # Response (200)
///
/// ```json
/// {
///   "id": 1,
///   "username": "ada",
///   "email": "ada@example.com",
///   "google_access_token": "ya29...",
///   "google_refresh_token": null,
///   "google_token_expiry": null,
///   "roles": ["admin"]
/// }
/// ```
pub async fn get_user(
    State(pool): State<DbPool>,
    PathParam(user_id): PathParam<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT
            u.id,
            u.username,
            u.email,
            u.google_access_token,
            u.google_refresh_token,
            u.google_token_expiry,
            GROUP_CONCAT(r.name) AS roles
        FROM users u
        LEFT JOIN user_roles ur ON u.id = ur.user_id
        LEFT JOIN roles r ON ur.role_id = r.id
        WHERE u.id = ?
        GROUP BY u.id
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::UserNotFound)?;

    Ok(Json(user.into()))
}

/// Update username, email and/or password.
///
/// Fields left out of the body keep their current value. A new password
/// must satisfy the strength policy and is stored hashed.
pub async fn update_user(
    State(pool): State<DbPool>,
    PathParam(user_id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let password_hash = match non_empty(request.password) {
        Some(password) => {
            password_service::validate_password_strength(&password)?;
            Some(password_service::hash_password(password).await?)
        }
        None => None,
    };

    let result = sqlx::query(
        r#"
        UPDATE users
        SET
            username = COALESCE(?, username),
            email = COALESCE(?, email),
            password_hash = COALESCE(?, password_hash)
        WHERE id = ?
        "#,
    )
    .bind(non_empty(request.username))
    .bind(non_empty(request.email))
    .bind(password_hash)
    .bind(user_id)
    .execute(&pool)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::UserConflict,
        _ => AppError::Database(e),
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::UserNotUpdated);
    }

    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Delete a user.
///
/// # Response
///
/// 204 No Content on success, 404 if the user does not exist.
pub async fn delete_user(
    State(pool): State<DbPool>,
    PathParam(user_id): PathParam<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::UserNotFound);
    }

    tracing::info!(user_id, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}
