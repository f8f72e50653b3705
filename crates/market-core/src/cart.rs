//! # Cart Rules
//!
//! Quantity and total calculations for persisted cart lines.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add (first time)  ──► line created, quantity = 1                       │
//! │  add (again)       ──► quantity + 1 (never a second line)               │
//! │  update(n > 0)     ──► quantity = n                                     │
//! │  update(n <= 0)    ──► line deleted                                     │
//! │  remove / checkout ──► line deleted                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, MarketError};
use crate::money::Money;
use crate::types::CartEntry;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// Sum of `price × quantity` over every line.
///
/// Lines whose item was taken by someone else still count; checkout is what
/// resolves them.
///
/// ## Errors
/// * `AmountTooLarge` - the sum does not fit in `Money`
///
/// ## Example
/// ```rust
/// use market_core::cart::cart_total;
///
/// assert!(cart_total(&[]).unwrap().is_zero());
/// ```
pub fn cart_total(entries: &[CartEntry]) -> CoreResult<Money> {
    entries.iter().try_fold(Money::zero(), |total, entry| {
        entry
            .line_total()
            .and_then(|line| total.checked_add(line))
            .ok_or(MarketError::AmountTooLarge)
    })
}

/// What an "update quantity" request does to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "action", content = "quantity", rename_all = "snake_case")]
pub enum QuantityChange {
    Set(i64),
    Remove,
}

impl QuantityChange {
    /// Maps a requested quantity onto a line change.
    ///
    /// Zero and negative values collapse to `Remove`.
    pub fn from_requested(qty: i64) -> CoreResult<Self> {
        if qty <= 0 {
            return Ok(QuantityChange::Remove);
        }

        if qty > MAX_ITEM_QUANTITY {
            return Err(MarketError::QuantityTooLarge {
                requested: qty,
                max: MAX_ITEM_QUANTITY,
            });
        }

        Ok(QuantityChange::Set(qty))
    }
}

/// Quantity after one more unit is added to an existing line.
pub fn next_quantity(current: i64) -> CoreResult<i64> {
    let next = current + 1;

    if next > MAX_ITEM_QUANTITY {
        return Err(MarketError::QuantityTooLarge {
            requested: next,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(next)
}

/// Checks that a cart holding `line_count` lines may take a new one.
pub fn check_capacity(line_count: usize) -> CoreResult<()> {
    if line_count >= MAX_CART_LINES {
        return Err(MarketError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(item_id: i64, price: i64, quantity: i64, owner_id: Option<i64>) -> CartEntry {
        CartEntry {
            line_id: item_id,
            user_id: 1,
            item_id,
            name: format!("item-{item_id}"),
            price,
            quantity,
            owner_id,
        }
    }

    #[test]
    fn test_cart_total() {
        let entries = vec![entry(1, 40, 1, None), entry(2, 70, 1, None)];
        assert_eq!(cart_total(&entries).unwrap().units(), 110);

        let entries = vec![entry(1, 40, 3, None), entry(2, 5, 2, None)];
        assert_eq!(cart_total(&entries).unwrap().units(), 130);
    }

    #[test]
    fn test_cart_total_overflow() {
        let entries = vec![entry(1, i64::MAX / 2 + 1, 2, None)];
        assert!(matches!(cart_total(&entries), Err(MarketError::AmountTooLarge)));

        let entries = vec![entry(1, i64::MAX, 1, None), entry(2, 1, 1, None)];
        assert!(matches!(cart_total(&entries), Err(MarketError::AmountTooLarge)));
    }

    #[test]
    fn test_cart_total_includes_taken_items() {
        let entries = vec![entry(1, 40, 1, None), entry(2, 70, 1, Some(9))];
        assert_eq!(cart_total(&entries).unwrap().units(), 110);
    }

    #[test]
    fn test_quantity_change() {
        assert_eq!(QuantityChange::from_requested(3).unwrap(), QuantityChange::Set(3));
        assert_eq!(QuantityChange::from_requested(0).unwrap(), QuantityChange::Remove);
        assert_eq!(QuantityChange::from_requested(-4).unwrap(), QuantityChange::Remove);
        assert!(matches!(
            QuantityChange::from_requested(1000),
            Err(MarketError::QuantityTooLarge { requested: 1000, .. })
        ));
    }

    #[test]
    fn test_next_quantity() {
        assert_eq!(next_quantity(1).unwrap(), 2);
        assert!(next_quantity(MAX_ITEM_QUANTITY).is_err());
    }

    #[test]
    fn test_check_capacity() {
        assert!(check_capacity(0).is_ok());
        assert!(check_capacity(MAX_CART_LINES - 1).is_ok());
        assert!(matches!(
            check_capacity(MAX_CART_LINES),
            Err(MarketError::CartTooLarge { .. })
        ));
    }
}
