//! # Repository Module
//!
//! Entity Store queries for Bazaar Market.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Functions                                 │
//! │                                                                         │
//! │  Service (market-server)                                               │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                               │
//! │       │  items::claim(&mut tx, item_id, buyer_id)                      │
//! │       ▼                                                                 │
//! │  repository::{users, items, cart}                                      │
//! │  ├── fn(conn: &mut SqliteConnection, ...)                              │
//! │  │     works with a pooled connection OR a transaction                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are free functions over `&mut SqliteConnection` rather than
//! repository structs borrowing the pool: a single request transaction has
//! to thread through users, items and cart alike, and a struct holding
//! `&SqlitePool` cannot join it.
//!
//! Functions here never decide business rules. Conditional updates
//! (`claim`, `release`, `debit`) report whether a row matched and leave the
//! interpretation to the caller.
//!
//! ## Available Repositories
//!
//! - [`users`] - Accounts, budgets, roles
//! - [`items`] - Catalog and ownership
//! - [`cart`] - Cart lines

pub mod cart;
pub mod items;
pub mod users;
