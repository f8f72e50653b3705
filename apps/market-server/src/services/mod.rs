//! Request-level marketplace operations.
//!
//! Each service function opens its own commit boundary on the [`Database`]
//! and returns plain data or an [`AppError`]; the web layer turns that into
//! a redirect and flash.
//!
//! [`Database`]: market_db::Database
//! [`AppError`]: crate::error::AppError

pub mod accounts;
pub mod admin;
pub mod cart;
pub mod checkout;
pub mod market;
pub mod ownership;
