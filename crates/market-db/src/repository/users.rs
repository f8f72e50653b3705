//! # User Repository
//!
//! Account rows and budget adjustments.
//!
//! ## Budget Updates
//! ```text
//! debit:   UPDATE users SET budget = budget - ?amount
//!          WHERE id = ?user AND budget >= ?amount      ← 0 rows: not enough
//! credit:  UPDATE users SET budget = budget + ?amount
//! set:     UPDATE users SET budget = ?budget           ← CHECK (budget >= 0)
//! ```

use chrono::Utc;
use market_core::{Role, User};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub budget: i64,
    pub role: Role,
}

/// Inserts a new user and returns the stored row.
///
/// ## Returns
/// * `Err(DbError::UniqueViolation)` - username or email already taken;
///   `field` is `users.username` or `users.email`
pub async fn insert(conn: &mut SqliteConnection, user: &NewUser) -> DbResult<User> {
    debug!(username = %user.username, role = %user.role, "Inserting user");

    let created = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, budget, role, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id, username, email, password_hash, budget, role, created_at
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.budget)
    .bind(user.role)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(created)
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, budget, role, created_at
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

pub async fn find_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, budget, role, created_at
        FROM users
        WHERE username = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user)
}

/// Checks whether a username or email is already registered.
///
/// Returns `(username_taken, email_taken)`.
pub async fn identity_taken(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
) -> DbResult<(bool, bool)> {
    let (username_taken, email_taken): (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS (SELECT 1 FROM users WHERE username = ?1),
            EXISTS (SELECT 1 FROM users WHERE email = ?2)
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(&mut *conn)
    .await?;

    Ok((username_taken, email_taken))
}

/// All users, oldest first.
pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, budget, role, created_at
        FROM users
        ORDER BY id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(users)
}

/// Overwrites a user's budget. Returns false if the user does not exist.
pub async fn set_budget(conn: &mut SqliteConnection, id: i64, budget: i64) -> DbResult<bool> {
    debug!(user_id = id, budget, "Setting budget");

    let result = sqlx::query("UPDATE users SET budget = ?1 WHERE id = ?2")
        .bind(budget)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Subtracts `amount` only if the budget covers it.
///
/// Returns false when the user is missing or the budget is too small;
/// nothing is changed in that case.
pub async fn debit(conn: &mut SqliteConnection, id: i64, amount: i64) -> DbResult<bool> {
    debug!(user_id = id, amount, "Debiting budget");

    let result = sqlx::query(
        r#"
        UPDATE users
        SET budget = budget - ?1
        WHERE id = ?2 AND budget >= ?1
        "#,
    )
    .bind(amount)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Adds a non-negative `amount` to the budget.
///
/// Returns false if the user does not exist or the new budget would not fit
/// in an `i64`; nothing is changed in that case.
pub async fn credit(conn: &mut SqliteConnection, id: i64, amount: i64) -> DbResult<bool> {
    debug!(user_id = id, amount, "Crediting budget");

    let result = sqlx::query(
        r#"
        UPDATE users
        SET budget = budget + ?1
        WHERE id = ?2 AND budget <= ?3
        "#,
    )
    .bind(amount)
    .bind(id)
    .bind(i64::MAX - amount)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Hard-deletes a user row. Returns false if it did not exist.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
    debug!(user_id = id, "Deleting user");

    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
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
    use crate::error::DbError;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();

        let alice = test_support::user(&mut conn, "alice", 100).await;
        assert_eq!(alice.budget, 100);
        assert_eq!(alice.role, Role::Regular);

        let found = find_by_username(&mut conn, "alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.password_hash, "hash");

        assert!(find_by_id(&mut conn, alice.id + 100).await.unwrap().is_none());
        assert_eq!(count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_role_is_stored() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();

        let admin = insert(
            &mut conn,
            &NewUser {
                username: "root".to_string(),
                email: "root@example.com".to_string(),
                password_hash: "hash".to_string(),
                budget: 0,
                role: Role::Admin,
            },
        )
        .await
        .unwrap();

        let found = find_by_id(&mut conn, admin.id).await.unwrap().unwrap();
        assert!(found.is_admin());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();

        test_support::user(&mut conn, "alice", 100).await;
        assert_eq!(
            identity_taken(&mut conn, "alice", "other@example.com").await.unwrap(),
            (true, false)
        );

        let err = insert(
            &mut conn,
            &NewUser {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
                budget: 100,
                role: Role::Regular,
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_unique_violation_on("users.username"));
    }

    #[tokio::test]
    async fn test_debit_is_guarded() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", 100).await;

        assert!(debit(&mut conn, alice.id, 40).await.unwrap());
        assert!(!debit(&mut conn, alice.id, 70).await.unwrap());

        let found = find_by_id(&mut conn, alice.id).await.unwrap().unwrap();
        assert_eq!(found.budget, 60);

        assert!(credit(&mut conn, alice.id, 40).await.unwrap());
        let found = find_by_id(&mut conn, alice.id).await.unwrap().unwrap();
        assert_eq!(found.budget, 100);
    }

    #[tokio::test]
    async fn test_credit_refuses_overflow() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", i64::MAX - 10).await;

        assert!(!credit(&mut conn, alice.id, 11).await.unwrap());
        assert!(credit(&mut conn, alice.id, 10).await.unwrap());

        let found = find_by_id(&mut conn, alice.id).await.unwrap().unwrap();
        assert_eq!(found.budget, i64::MAX);
    }

    #[tokio::test]
    async fn test_negative_budget_rejected_by_schema() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", 100).await;

        let err = set_budget(&mut conn, alice.id, -5).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));

        assert!(set_budget(&mut conn, alice.id, 250).await.unwrap());
        let found = find_by_id(&mut conn, alice.id).await.unwrap().unwrap();
        assert_eq!(found.budget, 250);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_support::database().await;
        let mut conn = db.acquire().await.unwrap();
        let alice = test_support::user(&mut conn, "alice", 100).await;

        assert!(delete(&mut conn, alice.id).await.unwrap());
        assert!(!delete(&mut conn, alice.id).await.unwrap());
        assert!(list(&mut conn).await.unwrap().is_empty());
    }
}
