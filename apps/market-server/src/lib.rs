//! # Bazaar Market Server
//!
//! HTTP application for a multi-user marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Market Server                                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  web/  (axum handlers)                                           │  │
//! │  │   extract CurrentUser / AdminUser, form, path                    │  │
//! │  │   answer View (200 JSON) or FlashRedirect (303 + flash cookie)   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │  services/                                                       │  │
//! │  │  ┌───────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐ │  │
//! │  │  │ ownership │ │   cart   │ │ checkout │ │ admin  │ │accounts │ │  │
//! │  │  │ buy/sell  │ │  lines   │ │ settle   │ │ CRUD   │ │ login   │ │  │
//! │  │  └───────────┘ └──────────┘ └──────────┘ └────────┘ └─────────┘ │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ one transaction per request            │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │  market-db (SQLite)                                              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - listen port (default: 8080)
//! - `BIND_ADDR` - listen interface (default: 0.0.0.0)
//! - `DATABASE_PATH` - SQLite file (default: ./market.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `SESSION_SECRET` - secret for signing session tokens
//! - `SESSION_LIFETIME_SECS` - session lifetime (default: 86400)
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` / `ADMIN_EMAIL` - administrator
//!   created at startup
//! - `DEFAULT_BUDGET` - budget for new accounts (default: 1000)

pub mod auth;
pub mod config;
pub mod error;
pub mod flash;
pub mod services;
pub mod web;

use std::sync::Arc;

use axum::Router;

use market_db::Database;

use crate::auth::JwtManager;

// Re-exports
pub use config::MarketConfig;
pub use error::{AppError, AppResult};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: MarketConfig,
}

impl AppState {
    pub fn new(db: Database, config: MarketConfig) -> Self {
        let jwt = JwtManager::new(config.session_secret.clone(), config.session_lifetime_secs);
        AppState { db, jwt, config }
    }
}

/// The full application with its state attached.
pub fn router(state: Arc<AppState>) -> Router {
    web::routes().with_state(state)
}
