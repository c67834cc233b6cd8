//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): SQLite connection string, e.g. `sqlite://data/trip-tracker.db`
/// - `JWT_SECRET` (required): HMAC secret used to sign and verify tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `JWT_EXPIRATION_SECS` (optional): token lifetime, defaults to 3600
/// - `AUTH_COOKIE_SECURE` (optional): mark the `auth_token` cookie `Secure`, defaults to false
/// - `CORS_ORIGIN` (optional): enables CORS for this single origin
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_jwt_expiration_secs")]
    pub jwt_expiration_secs: i64,

    #[serde(default)]
    pub auth_cookie_secure: bool,

    /// Frontend origin allowed to make credentialed cross-origin requests
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

/// One hour.
fn default_jwt_expiration_secs() -> i64 {
    3600
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (`DATABASE_URL`, `JWT_SECRET`)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are automatically converted: jwt_secret -> JWT_SECRET
        envy::from_env::<Config>()
    }
}
