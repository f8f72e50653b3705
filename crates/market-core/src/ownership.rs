//! # Ownership Rules
//!
//! Preconditions for moving an item between the market and a user.
//!
//! ```text
//!              buy (owner := buyer, budget -= price)
//!   ┌────────────┐ ─────────────────────────────────► ┌────────────────┐
//!   │ available  │                                     │ owned by user  │
//!   │ owner=NULL │ ◄───────────────────────────────── │ owner=user_id  │
//!   └────────────┘   sell (owner := NULL, budget += price)  └────────────┘
//! ```
//!
//! These checks run against a snapshot. The store repeats them as
//! conditional updates when the transfer is applied, so a check passing here
//! never by itself grants the item.

use crate::error::{CoreResult, MarketError};
use crate::money::Money;
use crate::types::Item;

/// True iff `seller_id` currently owns `item`.
#[inline]
pub fn can_sell(seller_id: i64, item: &Item) -> bool {
    item.is_owned_by(seller_id)
}

/// Checks that `item` can be bought with `budget`.
///
/// ## Errors
/// - `Unavailable` when the item already has an owner
/// - `InsufficientFunds` when the budget does not cover the price
pub fn check_buy(item: &Item, budget: Money) -> CoreResult<()> {
    if !item.is_available() {
        return Err(MarketError::Unavailable {
            name: item.name.clone(),
        });
    }

    let price = item.price();
    if !budget.covers(price) {
        return Err(MarketError::InsufficientFunds {
            required: price.units(),
            available: budget.units(),
        });
    }

    Ok(())
}

/// Checks that `seller_id` may sell `item` back to the market.
pub fn check_sell(item: &Item, seller_id: i64) -> CoreResult<()> {
    if !can_sell(seller_id, item) {
        return Err(MarketError::NotOwner {
            name: item.name.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(price: i64, owner_id: Option<i64>) -> Item {
        Item {
            id: 1,
            name: "Lamp".to_string(),
            price,
            barcode: "LAMP01".to_string(),
            description: "Desk lamp".to_string(),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_sell() {
        assert!(can_sell(5, &item(40, Some(5))));
        assert!(!can_sell(5, &item(40, Some(6))));
        assert!(!can_sell(5, &item(40, None)));
    }

    #[test]
    fn test_check_buy() {
        assert!(check_buy(&item(40, None), Money::from_units(100)).is_ok());
        assert!(check_buy(&item(100, None), Money::from_units(100)).is_ok());
        assert!(check_buy(&item(0, None), Money::zero()).is_ok());

        assert!(matches!(
            check_buy(&item(40, Some(2)), Money::from_units(100)),
            Err(MarketError::Unavailable { .. })
        ));
        assert!(matches!(
            check_buy(&item(110, None), Money::from_units(100)),
            Err(MarketError::InsufficientFunds {
                required: 110,
                available: 100
            })
        ));
    }

    #[test]
    fn test_check_sell() {
        assert!(check_sell(&item(40, Some(5)), 5).is_ok());
        assert!(matches!(
            check_sell(&item(40, None), 5),
            Err(MarketError::NotOwner { .. })
        ));
    }
}
