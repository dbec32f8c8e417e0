// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Access token lifetime in seconds (short-lived).
    pub access_token_expiration: u64,
    /// Refresh token lifetime in seconds (long-lived).
    pub refresh_token_expiration: u64,
    pub rust_log: String,
    /// Directory for uploaded profile pictures.
    pub upload_dir: String,
    /// Optional JSON file with state/city reference data, loaded at startup.
    pub geo_seed_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let access_token_expiration = env::var("ACCESS_TOKEN_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let refresh_token_expiration = env::var("REFRESH_TOKEN_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60 * 60 * 24 * 30);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let geo_seed_path = env::var("GEO_SEED_PATH").ok();

        Self {
            database_url,
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
            rust_log,
            upload_dir,
            geo_seed_path,
        }
    }
}
