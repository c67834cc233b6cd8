//! Session token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Read the token from the `auth_token` cookie (or a Bearer header)
//! 2. Verify its signature and expiry
//! 3. Check that it is still recorded in `user_tokens`
//! 4. Inject authentication context into the request
//! 5. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{error::AppError, services::auth_service, state::AppState};

/// Name of the cookie set by `POST /login`.
pub const AUTH_COOKIE: &str = "auth_token";

/// Authentication context attached to authenticated requests.
///
/// Route handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,

    /// The raw token, needed to revoke it on logout
    pub token: String,
}

/// Token authentication middleware function.
///
/// # Flow
///
/// 1. Take `auth_token` from the cookies, falling back to `Authorization: Bearer <token>`
/// 2. Verify the JWT against the configured secret
/// 3. Require a matching row in `user_tokens`
/// 4. If valid: inject `AuthContext` into request, call next handler
/// 5. Otherwise: return 401 Unauthorized
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::Unauthorized)?;

    let claims = state.tokens.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "rejected auth token");
        AppError::Unauthorized
    })?;

    if !auth_service::token_is_recorded(&state.pool, &token).await? {
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(AuthContext {
        user_id: claims.id,
        username: claims.username,
        token,
    });

    Ok(next.run(request).await)
}

fn extract_token(request: &Request) -> Option<String> {
    let jar = CookieJar::from_headers(request.headers());
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        return Some(cookie.value().to_string());
    }

    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}
