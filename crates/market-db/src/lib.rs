//! # market-db: Entity Store for Bazaar Market
//!
//! This crate persists users, items and cart lines in SQLite using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Market Data Flow                          │
//! │                                                                         │
//! │  HTTP handler (POST /cart/checkout)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Service (market-server) ── one Transaction per request                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     market-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ users, items, │    │  (embedded)  │  │   │
//! │  │   │               │    │ cart          │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│               │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DATABASE_PATH)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Query functions for users, items and cart lines
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_db::{Database, DbConfig, repository::items};
//!
//! let db = Database::new(DbConfig::new("./market.db")).await?;
//! let mut conn = db.acquire().await?;
//! let on_sale = items::list_available(&mut conn).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::items::NewItem;
pub use repository::users::NewUser;
