//! # Admin Operations
//!
//! Inventory and account management. Callers must already hold an
//! [`AdminUser`](crate::auth::AdminUser); nothing here re-checks the role.
//!
//! ## Deletes
//! ```text
//! delete_item:  cart lines for item ──► item
//! delete_user:  owned items back to market ──► user's cart ──► user
//! ```
//! Each runs in one transaction; the foreign keys would cascade anyway, the
//! explicit steps keep the order visible and logged.

use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use market_core::validation::{
    parse_integer, validate_barcode, validate_budget, validate_description, validate_item_name,
    validate_price,
};
use market_core::{Item, MarketError, User, ValidationError};
use market_db::repository::{cart, items, users};
use market_db::{Database, DbError, NewItem};

use crate::error::{AppError, AppResult};

/// Admin panel listing.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct AdminDashboard {
    pub users: Vec<User>,
    pub items: Vec<Item>,
}

/// Item create/edit form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
}

/// Budget edit form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetForm {
    pub budget: Option<String>,
}

impl ItemForm {
    /// Validates every field. A blank price falls back to `current_price`
    /// when one is given.
    fn validate(&self, current_price: Option<i64>) -> AppResult<NewItem> {
        let name = validate_item_name(self.name.as_deref())?;

        let blank_price = self.price.as_deref().map_or(true, |p| p.trim().is_empty());
        let price = match current_price {
            Some(current) if blank_price => current,
            _ => parse_integer("price", self.price.as_deref())?,
        };
        validate_price(price)?;

        let barcode = validate_barcode(self.barcode.as_deref())?;
        let description = validate_description(self.description.as_deref())?;

        Ok(NewItem {
            name,
            price,
            barcode,
            description,
        })
    }
}

fn barcode_taken(err: DbError, barcode: &str) -> AppError {
    if err.is_unique_violation_on("items.barcode") {
        ValidationError::Duplicate {
            field: "barcode".to_string(),
            value: barcode.to_string(),
        }
        .into()
    } else {
        err.into()
    }
}

pub async fn dashboard(db: &Database) -> AppResult<AdminDashboard> {
    let mut conn = db.acquire().await?;

    Ok(AdminDashboard {
        users: users::list(&mut conn).await?,
        items: items::list_all(&mut conn).await?,
    })
}

pub async fn create_item(db: &Database, form: &ItemForm) -> AppResult<Item> {
    let new_item = form.validate(None)?;

    let mut conn = db.acquire().await?;
    let item = items::insert(&mut conn, &new_item)
        .await
        .map_err(|e| barcode_taken(e, &new_item.barcode))?;

    info!(item_id = item.id, barcode = %item.barcode, "Item created");
    Ok(item)
}

pub async fn item_for_edit(db: &Database, item_id: i64) -> AppResult<Item> {
    let mut conn = db.acquire().await?;

    Ok(items::find_by_id(&mut conn, item_id)
        .await?
        .ok_or_else(|| MarketError::not_found("Item", item_id))?)
}

/// Replaces an item's fields; ownership is left alone.
pub async fn edit_item(db: &Database, item_id: i64, form: &ItemForm) -> AppResult<Item> {
    let mut tx = db.begin().await?;

    let current = items::find_by_id(&mut tx, item_id)
        .await?
        .ok_or_else(|| MarketError::not_found("Item", item_id))?;

    let changes = form.validate(Some(current.price))?;

    items::update(&mut tx, item_id, &changes)
        .await
        .map_err(|e| barcode_taken(e, &changes.barcode))?;

    tx.commit().await?;

    info!(item_id, "Item updated");

    Ok(Item {
        name: changes.name,
        price: changes.price,
        barcode: changes.barcode,
        description: changes.description,
        ..current
    })
}

pub async fn delete_item(db: &Database, item_id: i64) -> AppResult<Item> {
    let mut tx = db.begin().await?;

    let item = items::find_by_id(&mut tx, item_id)
        .await?
        .ok_or_else(|| MarketError::not_found("Item", item_id))?;

    let lines = cart::delete_for_item(&mut tx, item_id).await?;
    items::delete(&mut tx, item_id).await?;

    tx.commit().await?;

    info!(item_id, cart_lines = lines, "Item deleted");
    Ok(item)
}

/// Deletes an account. Administrators cannot delete themselves.
///
/// ## Errors
/// * `AccessDenied` - `user_id` is the acting administrator
/// * `NotFound` - no such user
pub async fn delete_user(db: &Database, acting_admin_id: i64, user_id: i64) -> AppResult<User> {
    if acting_admin_id == user_id {
        return Err(MarketError::AccessDenied.into());
    }

    let mut tx = db.begin().await?;

    let user = users::find_by_id(&mut tx, user_id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", user_id))?;

    let released = items::release_all_owned_by(&mut tx, user_id).await?;
    let lines = cart::clear(&mut tx, user_id).await?;
    users::delete(&mut tx, user_id).await?;

    tx.commit().await?;

    info!(user_id, released, cart_lines = lines, "User deleted");
    Ok(user)
}

/// Sets a budget from raw form input.
///
/// ## Errors
/// * `ValidationError` - not an integer, or negative
/// * `NotFound` - no such user
pub async fn set_budget(db: &Database, user_id: i64, raw_budget: Option<&str>) -> AppResult<User> {
    let budget = parse_integer("budget", raw_budget)?;
    validate_budget(budget)?;

    let mut tx = db.begin().await?;

    let user = users::find_by_id(&mut tx, user_id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", user_id))?;

    users::set_budget(&mut tx, user_id, budget).await?;
    tx.commit().await?;

    info!(user_id, budget, "Budget updated");

    Ok(User { budget, ..user })
}

// =============================================================================
// Unit Tests
// =============================================================================
