//! HTTP route table.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Build the application router.
///
/// Routes that need a session sit behind the auth middleware; everything
/// else is public.
pub fn router(state: AppState) -> Router {
    let authenticated_routes = Router::new()
        .route("/users/token", get(handlers::auth::google_token))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/login", post(handlers::auth::login))
        // Users
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/api/users/{id}/password",
            put(handlers::passwords::update_password),
        )
        .route(
            "/user/change-password",
            post(handlers::passwords::change_password),
        )
        // Attractions
        .route(
            "/api/attractions",
            get(handlers::attractions::list_attractions)
                .post(handlers::attractions::create_attraction),
        )
        .route(
            "/api/attractions/{id}",
            get(handlers::attractions::get_attraction)
                .put(handlers::attractions::update_attraction)
                .delete(handlers::attractions::delete_attraction),
        )
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(state.config.cors_origin.as_deref()) {
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Credentialed CORS for the single configured frontend origin.
fn cors_layer(origin: Option<&str>) -> Option<CorsLayer> {
    let origin = origin?;

    match origin.parse::<HeaderValue>() {
        Ok(value) => Some(
            CorsLayer::new()
                .allow_origin(value)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        ),
        Err(e) => {
            tracing::warn!(origin, error = %e, "ignoring invalid CORS_ORIGIN");
            None
        }
    }
}
