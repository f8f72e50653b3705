//! # HTTP Routes
//!
//! ```text
//! ┌──────────────────────────────┬─────────────────────────┬───────────┐
//! │  Route                       │  Handler                │  Caller   │
//! ├──────────────────────────────┼─────────────────────────┼───────────┤
//! │  GET  /                      │  accounts::home         │  anyone   │
//! │  GET  /health                │  health                 │  anyone   │
//! │  GET  POST /register         │  accounts::register_*   │  anyone   │
//! │  GET  POST /login            │  accounts::login_*      │  anyone   │
//! │  GET  /logout                │  accounts::logout       │  anyone   │
//! │  GET  POST /market           │  market::{page, sell}   │  user     │
//! │  POST /add_to_cart/{id}      │  cart::add              │  user     │
//! │  GET  /cart                  │  cart::page             │  user     │
//! │  POST /cart/remove/{id}      │  cart::remove           │  user     │
//! │  POST /cart/update/{id}      │  cart::update           │  user     │
//! │  GET  POST /cart/checkout    │  cart::checkout_*       │  user     │
//! │  GET  /admin                 │  admin::dashboard       │  admin    │
//! │  POST /admin/delete_item/{id}│  admin::delete_item     │  admin    │
//! │  POST /admin/delete_user/{id}│  admin::delete_user     │  admin    │
//! │  POST /admin/user/{id}/budget│  admin::set_budget      │  admin    │
//! │  GET  POST /admin/item/{id}/edit │ admin::edit_*       │  admin    │
//! │  GET  POST /admin/item/add   │  admin::add_*           │  admin    │
//! └──────────────────────────────┴─────────────────────────┴───────────┘
//! ```
//!
//! GET views answer `200` JSON wrapped in a [`Page`](crate::flash::Page);
//! every POST answers `303` with a flash.

pub mod accounts;
pub mod admin;
pub mod cart;
pub mod market;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// Builds the application router.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(accounts::home))
        .route("/health", get(health))
        .route("/register", get(accounts::register_page).post(accounts::register_submit))
        .route("/login", get(accounts::login_page).post(accounts::login_submit))
        .route("/logout", get(accounts::logout))
        .route("/market", get(market::page).post(market::sell))
        .route("/add_to_cart/{item_id}", post(cart::add))
        .route("/cart", get(cart::page))
        .route("/cart/remove/{line_id}", post(cart::remove))
        .route("/cart/update/{line_id}", post(cart::update))
        .route("/cart/checkout", get(cart::checkout_page).post(cart::checkout_submit))
        .route("/admin", get(admin::dashboard))
        .route("/admin/delete_item/{item_id}", post(admin::delete_item))
        .route("/admin/delete_user/{user_id}", post(admin::delete_user))
        .route("/admin/user/{user_id}/budget", post(admin::set_budget))
        .route("/admin/item/{item_id}/edit", get(admin::edit_page).post(admin::edit_submit))
        .route("/admin/item/add", get(admin::add_page).post(admin::add_submit))
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
    }
}
