//! Credential verification and session token bookkeeping.
//!
//! # Login Flow
//!
//! 1. Look the user up by username
//! 2. Compare the password against the stored hash
//! 3. Collect the user's role names
//! 4. Sign a JWT carrying identity and roles
//! 5. Record the token in `user_tokens`
//!
//! A token only authenticates while its row exists in `user_tokens`.

use crate::{
    db::DbPool,
    error::AppError,
    models::user::UserCredentials,
    services::{password_service, token_service::TokenService},
};

/// Verify a username/password pair.
///
/// # Errors
///
/// - `InvalidCredentials`: unknown username or wrong password
/// - `Database`: query failed
pub async fn verify_user(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> Result<UserCredentials, AppError> {
    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, username, email, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    let matches =
        password_service::verify_password(password.to_string(), user.password_hash.clone())
            .await?;

    if !matches {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

/// Role names granted to a user.
pub async fn fetch_roles(pool: &DbPool, user_id: i64) -> Result<Vec<String>, AppError> {
    let roles = sqlx::query_scalar::<_, String>(
        r#"
        SELECT roles.name
        FROM roles
        INNER JOIN user_roles ON roles.id = user_roles.role_id
        WHERE user_roles.user_id = ?
        ORDER BY roles.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(roles)
}

/// Authenticate and issue a recorded session token.
///
/// # Returns
///
/// The signed JWT, already stored in `user_tokens`.
pub async fn login(
    pool: &DbPool,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> Result<String, AppError> {
    let user = verify_user(pool, username, password).await?;
    let roles = fetch_roles(pool, user.id).await?;

    let token = tokens.issue(&user, roles)?;

    sqlx::query("INSERT INTO user_tokens (user_id, token) VALUES (?, ?)")
        .bind(user.id)
        .bind(&token)
        .execute(pool)
        .await?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(token)
}

/// Whether `token` was issued by [`login`] and not revoked since.
pub async fn token_is_recorded(pool: &DbPool, token: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_tokens WHERE token = ?)")
            .bind(token)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Remove a token so it no longer authenticates.
pub async fn revoke_token(pool: &DbPool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user_tokens WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Test fixtures shared by the handler tests.
#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub const PASSWORD: &str = "Voyage2024!abc";

    /// Insert a user with [`PASSWORD`] and the given roles; returns its id.
    pub async fn create_user(pool: &DbPool, username: &str, roles: &[&str]) -> i64 {
        let hash = password_service::hash_password(PASSWORD.to_string())
            .await
            .unwrap();

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(hash)
        .fetch_one(pool)
        .await
        .unwrap();

        for role in roles {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) SELECT ?, id FROM roles WHERE name = ?",
            )
            .bind(user_id)
            .bind(role)
            .execute(pool)
            .await
            .unwrap();
        }

        user_id
    }
}
