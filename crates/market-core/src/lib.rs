//! # market-core: Pure Business Logic for Bazaar Market
//!
//! This crate is the **heart** of Bazaar Market. It contains the marketplace
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bazaar Market Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Presentation layer (templates / SPA)             │   │
//! │  │       Market ──► Cart ──► Checkout ──► Admin panel              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    market-server (axum)                         │   │
//! │  │   OwnershipEngine, CartManager, CheckoutOrchestrator, admin     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ market-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐ │   │
//! │  │  │  types  │ │  money  │ │ownership │ │   cart   │ │checkout │ │   │
//! │  │  │  User   │ │  Money  │ │ buy/sell │ │  totals  │ │  forms  │ │   │
//! │  │  │  Item   │ │         │ │  rules   │ │ quantity │ │ summary │ │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └──────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 market-db (Entity Store)                        │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (User, Item, CartLine, Role)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Form field validation
//! - [`ownership`] - Buy/sell preconditions
//! - [`cart`] - Cart totals and quantity rules
//! - [`checkout`] - Payment/delivery input and checkout reports
//! - [`outcome`] - Redirect + flash response model
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::money::Money;
//!
//! let price = Money::from_units(40);
//! let budget = Money::from_units(100);
//! assert_eq!((budget - price).units(), 60);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod outcome;
pub mod ownership;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreResult, MarketError, ValidationError};
pub use money::Money;
pub use outcome::{Flash, FlashCategory, Outcome};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a checkout transaction small.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest price or budget an administrator may set.
///
/// 100 lines × 999 units × this amount still fits in an `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Budget granted to a freshly registered account.
pub const DEFAULT_BUDGET: i64 = 1000;
