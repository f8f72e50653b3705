//! # Money Module
//!
//! Provides the `Money` type for prices, budgets and cart totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Budgets and prices are whole currency units stored as i64.            │
//! │                                                                         │
//! │    buy:  budget_after = budget_before - price                           │
//! │    sell: budget_after = budget_before + price                           │
//! │                                                                         │
//! │  No rounding ever happens, so a buy followed by a sell restores the    │
//! │  budget exactly.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use market_core::money::Money;
//!
//! let price = Money::from_units(40);
//! let line_total = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line_total.units(), 120);
//! ```
//!
//! Totals are computed with the `checked_*` methods; the operator impls
//! saturate at the `i64` bounds and never panic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic is closed under subtraction; the store
///   rejects negative budgets, not the type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Item.price ──► CartEntry.line_total ──► cart_total ──► budget check
///                                                        │
/// User.budget ◄── debit on buy / credit on sell ◄────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let budget = Money::from_units(1000);
    /// assert_eq!(budget.units(), 1000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity; `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::money::Money;
    ///
    /// let unit_price = Money::from_units(70);
    /// assert_eq!(unit_price.checked_multiply_quantity(2).unwrap().units(), 140);
    /// assert!(Money::from_units(i64::MAX).checked_multiply_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Adds two amounts; `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Returns true when this amount can pay for `amount`.
    #[inline]
    pub const fn covers(&self, amount: Money) -> bool {
        self.0 >= amount.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display matches how the market shows budgets: `"100 $"`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} $", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
