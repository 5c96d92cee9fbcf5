//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Helpdesk API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Secret used to sign bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `HELPDESK_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:helpdesk.db?mode=rwc` |
    /// | `JWT_SECRET` | Token signing secret | (required) |
    /// | `TOKEN_TTL_MINUTES` | Token lifetime in minutes | `60` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("HELPDESK_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:helpdesk.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?;

        let token_ttl_minutes = match env::var("TOKEN_TTL_MINUTES") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidTokenTtl)?,
            Err(_) => 60,
        };

        Ok(Self {
            addr,
            database_url,
            jwt_secret,
            token_ttl_minutes,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid HELPDESK_ADDR format")]
    InvalidAddr,

    #[error("JWT_SECRET environment variable is required")]
    MissingJwtSecret,

    #[error("TOKEN_TTL_MINUTES must be an integer")]
    InvalidTokenTtl,
}
