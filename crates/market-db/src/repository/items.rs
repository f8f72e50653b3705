//! # Item Repository
//!
//! Catalog rows and ownership transfers.
//!
//! ## Check-and-Set Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  claim(item, buyer)                                                     │
//! │    UPDATE items SET owner_id = buyer                                    │
//! │    WHERE id = item AND owner_id IS NULL        ← 0 rows: already owned  │
//! │                                                                         │
//! │  release(item, seller)                                                  │
//! │    UPDATE items SET owner_id = NULL                                     │
//! │    WHERE id = item AND owner_id = seller       ← 0 rows: not the owner  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ownership condition is part of the UPDATE itself, so two concurrent
//! buyers can never both see one row affected.

use chrono::Utc;
use market_core::Item;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Fields an administrator sets on create or edit.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub price: i64,
    pub barcode: String,
    pub description: String,
}

const ITEM_COLUMNS: &str =
    "id, name, price, barcode, description, owner_id, created_at, updated_at";

/// Inserts a new, unowned item.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - barcode already exists (`items.barcode`)
pub async fn insert(conn: &mut SqliteConnection, item: &NewItem) -> DbResult<Item> {
    debug!(barcode = %item.barcode, "Inserting item");

    let now = Utc::now();
    let created = sqlx::query_as::<_, Item>(&format!(
        r#"
        INSERT INTO items (name, price, barcode, description, owner_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(&item.name)
    .bind(item.price)
    .bind(&item.barcode)
    .bind(&item.description)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(created)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}

/// Every item, owned or not.
pub async fn list_all(conn: &mut SqliteConnection) -> DbResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items ORDER BY id"
    ))
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Items on sale (no owner).
pub async fn list_available(conn: &mut SqliteConnection) -> DbResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id IS NULL ORDER BY id"
    ))
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

pub async fn list_owned_by(conn: &mut SqliteConnection, owner_id: i64) -> DbResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?1 ORDER BY id"
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Replaces the editable fields. Ownership is untouched.
pub async fn update(conn: &mut SqliteConnection, id: i64, item: &NewItem) -> DbResult<bool> {
    debug!(item_id = id, "Updating item");

    let result = sqlx::query(
        r#"
        UPDATE items
        SET name = ?1, price = ?2, barcode = ?3, description = ?4, updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&item.name)
    .bind(item.price)
    .bind(&item.barcode)
    .bind(&item.description)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Assigns `buyer_id` as owner only if the item is still unowned.
pub async fn claim(conn: &mut SqliteConnection, id: i64, buyer_id: i64) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET owner_id = ?1, updated_at = ?2
        WHERE id = ?3 AND owner_id IS NULL
        "#,
    )
    .bind(buyer_id)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    let claimed = result.rows_affected() == 1;
    debug!(item_id = id, buyer_id, claimed, "Claim item");
    Ok(claimed)
}

/// Clears the owner only if `seller_id` currently owns the item.
pub async fn release(conn: &mut SqliteConnection, id: i64, seller_id: i64) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET owner_id = NULL, updated_at = ?1
        WHERE id = ?2 AND owner_id = ?3
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .bind(seller_id)
    .execute(&mut *conn)
    .await?;

    let released = result.rows_affected() == 1;
    debug!(item_id = id, seller_id, released, "Release item");
    Ok(released)
}

/// Returns every item owned by `owner_id` to the market.
pub async fn release_all_owned_by(conn: &mut SqliteConnection, owner_id: i64) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE items SET owner_id = NULL, updated_at = ?1 WHERE owner_id = ?2",
    )
    .bind(Utc::now())
    .bind(owner_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Hard-deletes an item. Returns false if it did not exist.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
    debug!(item_id = id, "Deleting item");

    let result = sqlx::query("DELETE FROM items WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_insert_is_available() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();

        let lamp = test_support::item(&mut conn, "Lamp", 40).await;
        assert!(lamp.is_available());
        assert_eq!(lamp.price, 40);

        assert_eq!(list_available(&mut conn).await.unwrap().len(), 1);
        assert_eq!(count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_barcode() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        test_support::item(&mut conn, "Lamp", 40).await;

        let err = insert(
            &mut conn,
            &NewItem {
                name: "Other".to_string(),
                price: 1,
                barcode: "LAMP".to_string(),
                description: "dup".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_unique_violation_on("items.barcode"));
    }

    #[tokio::test]
    async fn test_claim_only_once() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", 100).await;
        let bob = test_support::user(&mut conn, "bob", 100).await;
        let lamp = test_support::item(&mut conn, "Lamp", 40).await;

        assert!(claim(&mut conn, lamp.id, alice.id).await.unwrap());
        assert!(!claim(&mut conn, lamp.id, bob.id).await.unwrap());

        let stored = find_by_id(&mut conn, lamp.id).await.unwrap().unwrap();
        assert_eq!(stored.owner_id, Some(alice.id));

        assert!(list_available(&mut conn).await.unwrap().is_empty());
        assert_eq!(list_owned_by(&mut conn, alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_release_requires_owner() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", 100).await;
        let bob = test_support::user(&mut conn, "bob", 100).await;
        let lamp = test_support::item(&mut conn, "Lamp", 40).await;

        claim(&mut conn, lamp.id, alice.id).await.unwrap();
        assert!(!release(&mut conn, lamp.id, bob.id).await.unwrap());
        assert!(release(&mut conn, lamp.id, alice.id).await.unwrap());

        let stored = find_by_id(&mut conn, lamp.id).await.unwrap().unwrap();
        assert!(stored.is_available());
    }

    #[tokio::test]
    async fn test_release_all_owned_by() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", 100).await;
        let lamp = test_support::item(&mut conn, "Lamp", 40).await;
        let desk = test_support::item(&mut conn, "Desk", 70).await;

        claim(&mut conn, lamp.id, alice.id).await.unwrap();
        claim(&mut conn, desk.id, alice.id).await.unwrap();

        assert_eq!(release_all_owned_by(&mut conn, alice.id).await.unwrap(), 2);
        assert_eq!(list_available(&mut conn).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let lamp = test_support::item(&mut conn, "Lamp", 40).await;

        let changed = NewItem {
            name: "Floor Lamp".to_string(),
            price: 55,
            barcode: "FLAMP".to_string(),
            description: "Taller".to_string(),
        };
        assert!(update(&mut conn, lamp.id, &changed).await.unwrap());

        let stored = find_by_id(&mut conn, lamp.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Floor Lamp");
        assert_eq!(stored.price, 55);

        assert!(delete(&mut conn, lamp.id).await.unwrap());
        assert!(find_by_id(&mut conn, lamp.id).await.unwrap().is_none());
        assert!(list_all(&mut conn).await.unwrap().is_empty());
    }
}
