//! # Domain Types
//!
//! Core domain types used throughout Bazaar Market.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Item       │   │    CartLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  owner_id?      │   │  id             │       │
//! │  │  username (uniq)│   │  name           │   │  user_id  ──────┼─► User│
//! │  │  budget         │   │  price          │   │  item_id  ──────┼─► Item│
//! │  │  role           │   │  barcode (uniq) │   │  quantity >= 1  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  owner_id = NULL  ⇔  item is available in the market                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Authorization role, fixed when the account is created.
///
/// Administrators are never recognised by username; only this field counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shopper: browse, cart, checkout, sell back.
    #[default]
    Regular,
    /// Manages inventory and user budgets.
    Admin,
}

impl Role {
    /// Returns true for the administrator role.
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Regular => write!(f, "regular"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A marketplace account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Unique contact address.
    pub email: String,

    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,

    /// Spendable amount in whole currency units, never negative.
    pub budget: i64,

    pub role: Role,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns the budget as a Money type.
    #[inline]
    pub fn budget(&self) -> Money {
        Money::from_units(self.budget)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// =============================================================================
// Item
// =============================================================================

/// A single-unit item listed in the market.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Price in whole currency units.
    pub price: i64,

    /// Unique barcode.
    pub barcode: String,

    pub description: String,

    /// Current owner; `None` means the item is available in the market.
    pub owner_id: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_units(self.price)
    }

    /// Checks if the item is still on sale.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.owner_id.is_none()
    }

    /// Checks if `user_id` owns the item.
    #[inline]
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One (user, item, quantity) record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub item_id: i64,
    /// Always >= 1; lower values delete the line instead.
    pub quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with the item it refers to.
///
/// The item data is read live, so an item bought by someone else after being
/// carted still shows here (with `owner_id` set) until checkout resolves it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartEntry {
    pub line_id: i64,
    pub user_id: i64,
    pub item_id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub owner_id: Option<i64>,
}

impl CartEntry {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_units(self.price)
    }

    /// Line total (price × quantity); `None` if it does not fit in `Money`.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.price().checked_multiply_quantity(self.quantity)
    }

    /// True when the item was bought after being carted.
    #[inline]
    pub fn is_taken(&self) -> bool {
        self.owner_id.is_some()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
