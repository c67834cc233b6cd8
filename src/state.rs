//! Shared application state handed to every handler.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, db::DbPool, services::token_service::TokenService};

/// Everything a request handler may need.
///
/// Cloning is cheap: the pool is reference counted internally and the
/// remaining members sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub tokens: Arc<TokenService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiration_secs);

        Self {
            pool,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}

// Handlers that only touch the database keep extracting `State<DbPool>`.
impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
