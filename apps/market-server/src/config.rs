//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use market_core::DEFAULT_BUDGET;

/// Development-only signing secret; production must set `SESSION_SECRET`.
const DEV_SESSION_SECRET: &str = "bazaar-market-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// HTTP port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Secret for signing session tokens
    #[serde(skip_serializing)]
    pub session_secret: String,

    /// Session lifetime in seconds
    pub session_lifetime_secs: i64,

    /// Administrator created at startup when `admin_password` is set
    pub admin_username: String,

    #[serde(skip_serializing)]
    pub admin_password: Option<String>,

    pub admin_email: String,

    /// Budget granted at registration
    pub default_budget: i64,
}

fn var_or<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = MarketConfig {
            http_port: var_or("HTTP_PORT", 8080)?,

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./market.db".to_string()),

            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5)?,

            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| DEV_SESSION_SECRET.to_string()),

            session_lifetime_secs: var_or("SESSION_LIFETIME_SECS", 86_400)?, // 1 day

            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),

            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),

            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@bazaar.local".to_string()),

            default_budget: var_or("DEFAULT_BUDGET", DEFAULT_BUDGET)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_secret.is_empty() {
            return Err(ConfigError::MissingRequired("SESSION_SECRET".to_string()));
        }

        if self.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_LIFETIME_SECS".to_string()));
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if self.default_budget < 0 {
            return Err(ConfigError::InvalidValue("DEFAULT_BUDGET".to_string()));
        }

        Ok(())
    }

    /// Returns true when the built-in development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.session_secret == DEV_SESSION_SECRET
    }

    /// `host:port` to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            http_port: 8080,
            bind_addr: "0.0.0.0".to_string(),
            database_path: "./market.db".to_string(),
            db_max_connections: 5,
            session_secret: DEV_SESSION_SECRET.to_string(),
            session_lifetime_secs: 86_400,
            admin_username: "admin".to_string(),
            admin_password: None,
            admin_email: "admin@bazaar.local".to_string(),
            default_budget: DEFAULT_BUDGET,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
