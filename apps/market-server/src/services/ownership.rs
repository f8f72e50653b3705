//! # Ownership Engine
//!
//! Moves items between the market and their owners, with the matching
//! budget adjustment.
//!
//! ## Buy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SAVEPOINT                                                              │
//! │    load item + buyer ──► check_buy (owner NULL, budget >= price)        │
//! │    claim:  UPDATE items SET owner_id = buyer                            │
//! │            WHERE id = ? AND owner_id IS NULL     0 rows ──► Unavailable │
//! │    debit:  UPDATE users SET budget = budget - price                     │
//! │            WHERE id = ? AND budget >= price      0 rows ──► Insufficient│
//! │  RELEASE (or ROLLBACK TO on any failure)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checks are repeated at write time by the guarded `UPDATE`s, so two
//! buyers racing for one item can never both win.

use market_core::ownership::{check_buy, check_sell};
use market_core::{Item, MarketError};
use market_db::repository::{items, users};
use market_db::Database;
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use crate::error::AppResult;

async fn load_item(conn: &mut SqliteConnection, item_id: i64) -> AppResult<Item> {
    Ok(items::find_by_id(conn, item_id)
        .await?
        .ok_or_else(|| MarketError::not_found("Item", item_id))?)
}

/// Transfers an unowned item to `buyer_id` and debits its price.
///
/// Runs in a savepoint on `conn`, so a failure leaves the surrounding
/// transaction untouched.
///
/// ## Errors
/// * `Unavailable` - the item already has an owner
/// * `InsufficientFunds` - the buyer's budget is below the price
/// * `NotFound` - no such item or user
pub async fn buy(conn: &mut SqliteConnection, item_id: i64, buyer_id: i64) -> AppResult<Item> {
    let mut sp = conn.begin().await?;

    let item = load_item(&mut sp, item_id).await?;
    let buyer = users::find_by_id(&mut sp, buyer_id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", buyer_id))?;

    check_buy(&item, buyer.budget())?;

    if !items::claim(&mut sp, item_id, buyer_id).await? {
        sp.rollback().await?;
        return Err(MarketError::Unavailable { name: item.name }.into());
    }

    if !users::debit(&mut sp, buyer_id, item.price).await? {
        sp.rollback().await?;
        return Err(MarketError::InsufficientFunds {
            required: item.price,
            available: buyer.budget,
        }
        .into());
    }

    sp.commit().await?;

    info!(item_id, buyer_id, price = item.price, "Item bought");

    Ok(Item {
        owner_id: Some(buyer_id),
        ..item
    })
}

/// Returns an owned item to the market and credits its price.
///
/// ## Errors
/// * `NotOwner` - `seller_id` does not own the item
/// * `NotFound` - no such item
/// * `AmountTooLarge` - the credit would overflow the seller's budget
pub async fn sell(conn: &mut SqliteConnection, item_id: i64, seller_id: i64) -> AppResult<Item> {
    let mut sp = conn.begin().await?;

    let item = load_item(&mut sp, item_id).await?;
    check_sell(&item, seller_id)?;

    if !items::release(&mut sp, item_id, seller_id).await? {
        sp.rollback().await?;
        return Err(MarketError::NotOwner { name: item.name }.into());
    }

    if !users::credit(&mut sp, seller_id, item.price).await? {
        sp.rollback().await?;
        return Err(MarketError::AmountTooLarge.into());
    }

    sp.commit().await?;

    info!(item_id, seller_id, price = item.price, "Item sold back to market");

    Ok(Item {
        owner_id: None,
        ..item
    })
}

/// Sells one item back to the market in its own transaction.
pub async fn sell_item(db: &Database, seller_id: i64, item_id: i64) -> AppResult<Item> {
    let mut tx = db.begin().await?;
    let item = sell(&mut tx, item_id, seller_id).await?;
    tx.commit().await?;
    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================
