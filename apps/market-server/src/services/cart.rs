//! # Cart Manager
//!
//! Per-user cart line lifecycle and totals.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_to_cart ──► new line (qty 1)  or  existing line qty + 1            │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  update_quantity ──► qty := n (n >= 1)   │   n <= 0 ──► line deleted    │
//! │  remove_line     ──► line deleted                                       │
//! │  checkout / clear_cart ──► all lines deleted                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the user who owns a line may change it; every other caller gets
//! `AccessDenied` and nothing is written.

use serde::Serialize;
use tracing::{debug, info};
use ts_rs::TS;

use market_core::cart::{cart_total, check_capacity, next_quantity, QuantityChange};
use market_core::validation::parse_integer;
use market_core::{CartEntry, CartLine, Item, MarketError, Money};
use market_db::repository::{cart, items};
use market_db::Database;
use sqlx::SqliteConnection;

use crate::error::AppResult;

/// The cart page.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CartView {
    pub entries: Vec<CartEntry>,
    pub total: Money,
}

async fn owned_line(conn: &mut SqliteConnection, user_id: i64, line_id: i64) -> AppResult<CartLine> {
    let line = cart::find_by_id(conn, line_id)
        .await?
        .ok_or_else(|| MarketError::not_found("Cart line", line_id))?;

    if line.user_id != user_id {
        return Err(MarketError::AccessDenied.into());
    }

    Ok(line)
}

/// Adds one unit of an available item to the user's cart.
///
/// ## Errors
/// * `Unavailable` - the item already has an owner
/// * `CartTooLarge` - a new line would exceed the line limit
/// * `QuantityTooLarge` - the existing line is at the quantity cap
pub async fn add_to_cart(db: &Database, user_id: i64, item_id: i64) -> AppResult<(Item, CartLine)> {
    let mut tx = db.begin().await?;

    let item = items::find_by_id(&mut tx, item_id)
        .await?
        .ok_or_else(|| MarketError::not_found("Item", item_id))?;

    if !item.is_available() {
        return Err(MarketError::Unavailable { name: item.name }.into());
    }

    match cart::find_line(&mut tx, user_id, item_id).await? {
        Some(line) => {
            next_quantity(line.quantity)?;
        }
        None => {
            let lines = cart::count_lines(&mut tx, user_id).await?;
            check_capacity(lines as usize)?;
        }
    }

    let line = cart::add_one(&mut tx, user_id, item_id).await?;
    tx.commit().await?;

    debug!(user_id, item_id, quantity = line.quantity, "Added to cart");

    Ok((item, line))
}

/// Sets a line's quantity from raw form input.
///
/// Zero or negative removes the line. Input that is not an integer is a
/// validation error and leaves the line as it was.
pub async fn update_quantity(
    db: &Database,
    user_id: i64,
    line_id: i64,
    raw_quantity: Option<&str>,
) -> AppResult<QuantityChange> {
    let mut tx = db.begin().await?;

    let line = owned_line(&mut tx, user_id, line_id).await?;
    let requested = parse_integer("quantity", raw_quantity)?;
    let change = QuantityChange::from_requested(requested)?;

    match change {
        QuantityChange::Set(quantity) => {
            cart::set_quantity(&mut tx, line.id, quantity).await?;
        }
        QuantityChange::Remove => {
            cart::delete_line(&mut tx, line.id).await?;
        }
    }

    tx.commit().await?;

    debug!(user_id, line_id, ?change, "Cart line updated");

    Ok(change)
}

/// Deletes one of the user's lines.
pub async fn remove_line(db: &Database, user_id: i64, line_id: i64) -> AppResult<()> {
    let mut tx = db.begin().await?;

    let line = owned_line(&mut tx, user_id, line_id).await?;
    cart::delete_line(&mut tx, line.id).await?;

    tx.commit().await?;

    debug!(user_id, line_id, "Cart line removed");
    Ok(())
}

/// Lines with live item data and their total.
pub async fn cart_view(db: &Database, user_id: i64) -> AppResult<CartView> {
    let mut conn = db.acquire().await?;
    let entries = cart::entries_for_user(&mut conn, user_id).await?;
    let total = cart_total(&entries)?;

    Ok(CartView { entries, total })
}

/// Deletes every line in the user's cart.
pub async fn clear_cart(db: &Database, user_id: i64) -> AppResult<u64> {
    let mut conn = db.acquire().await?;
    let removed = cart::clear(&mut conn, user_id).await?;

    info!(user_id, removed, "Cart cleared");
    Ok(removed)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::ownership;
    use crate::services::test_support::*;
    use market_core::ValidationError;

    #[tokio::test]
    async fn test_adding_twice_increments_quantity() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;

        add_to_cart(&db, alice.id, lamp.id).await.unwrap();
        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        assert_eq!(line.quantity, 2);

        let view = cart_view(&db, alice.id).await.unwrap();
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.total.units(), 80);
    }

    #[tokio::test]
    async fn test_total_sums_price_times_quantity() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let chair = item(&db, "Chair", 70).await;

        add_to_cart(&db, alice.id, lamp.id).await.unwrap();
        add_to_cart(&db, alice.id, lamp.id).await.unwrap();
        add_to_cart(&db, alice.id, chair.id).await.unwrap();

        let view = cart_view(&db, alice.id).await.unwrap();
        assert_eq!(view.total.units(), 150);
    }

    #[tokio::test]
    async fn test_owned_item_cannot_be_carted() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let bob = user(&db, "bob", 100).await;
        let lamp = item(&db, "Lamp", 40).await;

        let mut tx = db.begin().await.unwrap();
        ownership::buy(&mut tx, lamp.id, alice.id).await.unwrap();
        tx.commit().await.unwrap();

        let err = add_to_cart(&db, bob.id, lamp.id).await.unwrap_err();
        assert!(matches!(err, AppError::Market(MarketError::Unavailable { .. })));
        assert!(cart_view(&db, bob.id).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_update_to_zero_deletes_line() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let change = update_quantity(&db, alice.id, line.id, Some("0")).await.unwrap();

        assert_eq!(change, QuantityChange::Remove);
        assert!(cart_view(&db, alice.id).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_update_sets_quantity() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        update_quantity(&db, alice.id, line.id, Some(" 3 ")).await.unwrap();

        let view = cart_view(&db, alice.id).await.unwrap();
        assert_eq!(view.entries[0].quantity, 3);
        assert_eq!(view.total.units(), 120);
    }

    #[tokio::test]
    async fn test_non_integer_quantity_leaves_line() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let err = update_quantity(&db, alice.id, line.id, Some("two"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Market(MarketError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert_eq!(cart_view(&db, alice.id).await.unwrap().entries[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_quantity_cap() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let err = update_quantity(&db, alice.id, line.id, Some("1000"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Market(MarketError::QuantityTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_other_users_line_is_denied() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let bob = user(&db, "bob", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let err = update_quantity(&db, bob.id, line.id, Some("5")).await.unwrap_err();
        assert!(matches!(err, AppError::Market(MarketError::AccessDenied)));

        let err = remove_line(&db, bob.id, line.id).await.unwrap_err();
        assert!(matches!(err, AppError::Market(MarketError::AccessDenied)));

        assert_eq!(cart_view(&db, alice.id).await.unwrap().entries[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        let chair = item(&db, "Chair", 70).await;

        let (_, line) = add_to_cart(&db, alice.id, lamp.id).await.unwrap();
        add_to_cart(&db, alice.id, chair.id).await.unwrap();

        remove_line(&db, alice.id, line.id).await.unwrap();
        assert_eq!(cart_view(&db, alice.id).await.unwrap().entries.len(), 1);

        assert_eq!(clear_cart(&db, alice.id).await.unwrap(), 1);
        assert!(cart_view(&db, alice.id).await.unwrap().total.is_zero());
    }

    #[tokio::test]
    async fn test_missing_line_not_found() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;

        let err = remove_line(&db, alice.id, 42).await.unwrap_err();
        assert!(matches!(err, AppError::Market(MarketError::NotFound { .. })));
    }
}
