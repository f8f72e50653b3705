//! # Cart Repository
//!
//! Persisted cart lines, one per `(user_id, item_id)`.

use chrono::Utc;
use market_core::{CartEntry, CartLine};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Adds one unit of `item_id` to the user's cart.
///
/// Creates the line with quantity 1, or bumps an existing line by one; a
/// second line for the same pair is never created.
pub async fn add_one(conn: &mut SqliteConnection, user_id: i64, item_id: i64) -> DbResult<CartLine> {
    debug!(user_id, item_id, "Adding item to cart");

    let line = sqlx::query_as::<_, CartLine>(
        r#"
        INSERT INTO cart_items (user_id, item_id, quantity, created_at)
        VALUES (?1, ?2, 1, ?3)
        ON CONFLICT (user_id, item_id) DO UPDATE SET quantity = quantity + 1
        RETURNING id, user_id, item_id, quantity, created_at
        "#,
    )
    .bind(user_id)
    .bind(item_id)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(line)
}

pub async fn find_by_id(conn: &mut SqliteConnection, line_id: i64) -> DbResult<Option<CartLine>> {
    let line = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT id, user_id, item_id, quantity, created_at
        FROM cart_items
        WHERE id = ?1
        "#,
    )
    .bind(line_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(line)
}

pub async fn find_line(
    conn: &mut SqliteConnection,
    user_id: i64,
    item_id: i64,
) -> DbResult<Option<CartLine>> {
    let line = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT id, user_id, item_id, quantity, created_at
        FROM cart_items
        WHERE user_id = ?1 AND item_id = ?2
        "#,
    )
    .bind(user_id)
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(line)
}

/// The user's cart lines joined with live item data, in insertion order.
pub async fn entries_for_user(conn: &mut SqliteConnection, user_id: i64) -> DbResult<Vec<CartEntry>> {
    let entries = sqlx::query_as::<_, CartEntry>(
        r#"
        SELECT
            c.id AS line_id,
            c.user_id,
            c.item_id,
            i.name,
            i.price,
            c.quantity,
            i.owner_id
        FROM cart_items c
        JOIN items i ON i.id = c.item_id
        WHERE c.user_id = ?1
        ORDER BY c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(entries)
}

pub async fn count_lines(conn: &mut SqliteConnection, user_id: i64) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Sets a line's quantity. Callers pass values >= 1; the schema rejects less.
pub async fn set_quantity(conn: &mut SqliteConnection, line_id: i64, quantity: i64) -> DbResult<bool> {
    debug!(line_id, quantity, "Setting cart quantity");

    let result = sqlx::query("UPDATE cart_items SET quantity = ?1 WHERE id = ?2")
        .bind(quantity)
        .bind(line_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn delete_line(conn: &mut SqliteConnection, line_id: i64) -> DbResult<bool> {
    debug!(line_id, "Deleting cart line");

    let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1")
        .bind(line_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Deletes every line in the user's cart.
pub async fn clear(conn: &mut SqliteConnection, user_id: i64) -> DbResult<u64> {
    debug!(user_id, "Clearing cart");

    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes every line, in any cart, that refers to `item_id`.
pub async fn delete_for_item(conn: &mut SqliteConnection, item_id: i64) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE item_id = ?1")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================
