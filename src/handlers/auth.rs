//! Authentication HTTP handlers.
//!
//! - POST /login - Verify credentials, issue a JWT and set the `auth_token` cookie
//! - POST /logout - Revoke the presented token and clear the cookie
//! - GET /users/token - Stored Google access token of the authenticated user

use axum::{Extension, Json, extract::State};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{
    db::DbPool,
    error::AppError,
    extract::JsonBody,
    middleware::auth::{AUTH_COOKIE, AuthContext},
    models::{
        MessageResponse,
        user::{GoogleTokenResponse, LoginRequest, LoginResponse, non_empty},
    },
    services::auth_service,
    state::AppState,
};

/// Log a user in.
///
/// # Request Body
///
/// ```json
/// { "username": "ada", "password": "..." }
/// ```
///
/// # Response (200)
///
/// Sets `auth_token=<jwt>; HttpOnly; Path=/` and returns:
///
/// ```json
/// { "message": "Login successful", "token": "eyJhbGciOi..." }
/// ```
///
/// # Errors
///
/// - 400: username or password missing
/// - 401: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (Some(username), Some(password)) =
        (non_empty(request.username), non_empty(request.password))
    else {
        return Err(AppError::InvalidRequest(
            "Username and password are required".to_string(),
        ));
    };

    let token = auth_service::login(&state.pool, &state.tokens, &username, &password).await?;

    let cookie = Cookie::build((AUTH_COOKIE, token.clone()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.config.auth_cookie_secure);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
        }),
    ))
}

/// Revoke the current session token.
pub async fn logout(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    auth_service::revoke_token(&pool, &auth.token).await?;

    tracing::info!(user_id = auth.user_id, username = %auth.username, "user logged out");

    Ok((
        jar.remove(Cookie::build(AUTH_COOKIE).path("/")),
        Json(MessageResponse::new("Logout successful")),
    ))
}

/// Return the Google access token stored for the authenticated user.
///
/// # Response (200)
///
/// ```json
/// { "accessToken": "ya29..." }
/// ```
///
/// 404 when no Google token has been stored.
pub async fn google_token(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<GoogleTokenResponse>, AppError> {
    let access_token: String =
        sqlx::query_scalar::<_, Option<String>>("SELECT google_access_token FROM users WHERE id = ?")
            .bind(auth.user_id)
            .fetch_optional(&pool)
            .await?
            .flatten()
            .filter(|t| !t.is_empty())
            .ok_or(AppError::GoogleTokenNotFound)?;

    Ok(Json(GoogleTokenResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode, header};
    use serde_json::json;

    use crate::{
        routes::test_support::{TestApp, json_request},
        services::auth_service::fixtures::{PASSWORD, create_user},
    };

    async fn login(app: &TestApp, username: &str) -> String {
        let (status, body) = app
            .send_json(
                Method::POST,
                "/login",
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn with_cookie(method: Method, uri: &str, token: &str) -> axum::http::Request<axum::body::Body> {
        let mut request = json_request(method, uri, None);
        request.headers_mut().insert(
            header::COOKIE,
            format!("auth_token={token}").parse().unwrap(),
        );
        request
    }

    #[tokio::test]
    async fn login_sets_http_only_cookie_and_records_token() {
        let app = TestApp::new().await;
        create_user(&app.state.pool, "ada", &["user"]).await;

        let response = app
            .send_raw(json_request(
                Method::POST,
                "/login",
                Some(json!({ "username": "ada", "password": PASSWORD })),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("auth_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_tokens")
            .fetch_one(&app.state.pool)
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let app = TestApp::new().await;
        create_user(&app.state.pool, "ada", &[]).await;

        let (status, body) = app
            .send_json(
                Method::POST,
                "/login",
                json!({ "username": "ada", "password": "Wrong-pass-123" }),
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn login_without_password_is_400() {
        let app = TestApp::new().await;

        let (status, _) = app
            .send_json(Method::POST, "/login", json!({ "username": "ada" }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn google_token_requires_authentication() {
        let app = TestApp::new().await;

        let (status, _) = app.get("/users/token").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn google_token_is_returned_for_cookie_session() {
        let app = TestApp::new().await;
        let id = create_user(&app.state.pool, "ada", &[]).await;
        sqlx::query("UPDATE users SET google_access_token = 'ya29.token' WHERE id = ?")
            .bind(id)
            .execute(&app.state.pool)
            .await
            .unwrap();
        let token = login(&app, "ada").await;

        let (status, body) = app
            .send(with_cookie(Method::GET, "/users/token", &token))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accessToken"], "ya29.token");
    }

    #[tokio::test]
    async fn google_token_accepts_bearer_header() {
        let app = TestApp::new().await;
        create_user(&app.state.pool, "ada", &[]).await;
        let token = login(&app, "ada").await;

        let mut request = json_request(Method::GET, "/users/token", None);
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let (status, body) = app.send(request).await;

        // Authenticated, but no Google token stored yet
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Google access token not found");
    }

    #[tokio::test]
    async fn forged_token_is_rejected() {
        let app = TestApp::new().await;

        let (status, _) = app
            .send(with_cookie(Method::GET, "/users/token", "not.a.jwt"))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let app = TestApp::new().await;
        create_user(&app.state.pool, "ada", &[]).await;
        let token = login(&app, "ada").await;

        let (status, body) = app.send(with_cookie(Method::POST, "/logout", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logout successful");

        let (status, _) = app
            .send(with_cookie(Method::GET, "/users/token", &token))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
