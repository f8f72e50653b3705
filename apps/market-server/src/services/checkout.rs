//! # Checkout Orchestrator
//!
//! Converts a cart into ownership transfers.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. Load      cart lines            none ──► EmptyCart                 │
//! │   2. Validate  payment + delivery    bad  ──► ValidationError           │
//! │   3. Budget    budget >= cart total  no   ──► InsufficientFunds         │
//! │   4. Settle    per line:                                                │
//! │                  item taken by someone else ──► skipped (warning)       │
//! │                  otherwise ──► ownership::buy (own savepoint)           │
//! │   5. Finalize  clear cart                                               │
//! │  COMMIT ──► CheckoutReport { settled, skipped, charged, summary }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error before COMMIT drops the transaction, so a failed checkout
//! leaves cart and budget exactly as they were. Skipping a line is not an
//! error; the remaining lines still settle.
//!
//! A line is charged the item's price once, whatever its quantity: every
//! item is a single unit. The budget check still uses the displayed cart
//! total (price × quantity).

use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use market_core::cart::cart_total;
use market_core::checkout::{CheckoutForm, CheckoutReport, SkipReason};
use market_core::{CartEntry, MarketError, Money};
use market_db::repository::{cart, users};
use market_db::Database;

use crate::error::{AppError, AppResult};
use crate::services::ownership;

/// The checkout form page.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CheckoutPage {
    pub entries: Vec<CartEntry>,
    pub total: Money,
    pub budget: Money,
}

/// Data for rendering the checkout form.
///
/// ## Errors
/// * `EmptyCart` - nothing to check out
pub async fn checkout_page(db: &Database, user_id: i64) -> AppResult<CheckoutPage> {
    let mut conn = db.acquire().await?;

    let entries = cart::entries_for_user(&mut conn, user_id).await?;
    if entries.is_empty() {
        return Err(MarketError::EmptyCart.into());
    }

    let user = users::find_by_id(&mut conn, user_id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", user_id))?;

    Ok(CheckoutPage {
        total: cart_total(&entries)?,
        budget: user.budget(),
        entries,
    })
}

/// Runs a checkout for `user_id`.
pub async fn checkout(db: &Database, user_id: i64, form: &CheckoutForm) -> AppResult<CheckoutReport> {
    let mut tx = db.begin().await?;

    let entries = cart::entries_for_user(&mut tx, user_id).await?;
    if entries.is_empty() {
        return Err(MarketError::EmptyCart.into());
    }

    let request = form.validate()?;

    let buyer = users::find_by_id(&mut tx, user_id)
        .await?
        .ok_or_else(|| MarketError::not_found("User", user_id))?;

    let total = cart_total(&entries)?;
    if !buyer.budget().covers(total) {
        info!(user_id, total = total.units(), budget = buyer.budget, "Checkout rejected: budget");
        return Err(MarketError::InsufficientFunds {
            required: total.units(),
            available: buyer.budget,
        }
        .into());
    }

    let mut report = CheckoutReport::new(&request);

    for entry in &entries {
        if entry.is_taken() {
            warn!(user_id, item_id = entry.item_id, "Cart item taken by another user");
            report.skip(entry.item_id, entry.name.clone(), SkipReason::TakenByOther);
            continue;
        }

        match ownership::buy(&mut tx, entry.item_id, user_id).await {
            Ok(item) => {
                let charged = item.price();
                report.settle(item.id, item.name, charged);
            }
            Err(AppError::Market(MarketError::Unavailable { .. })) => {
                warn!(user_id, item_id = entry.item_id, "Cart item bought during checkout");
                report.skip(entry.item_id, entry.name.clone(), SkipReason::TakenByOther);
            }
            Err(err) => return Err(err),
        }
    }

    cart::clear(&mut tx, user_id).await?;
    tx.commit().await?;

    info!(
        user_id,
        settled = report.settled.len(),
        skipped = report.skipped.len(),
        charged = report.charged.units(),
        "Checkout completed"
    );

    Ok(report)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cart::{add_to_cart, cart_view, remove_line};
    use crate::services::test_support::*;
    use market_core::ValidationError;

    fn cash_pickup() -> CheckoutForm {
        CheckoutForm {
            payment_method: Some("cash".to_string()),
            delivery_method: Some("pickup".to_string()),
            pickup_point: Some("Central".to_string()),
            ..CheckoutForm::default()
        }
    }

    fn card_courier(number: &str, expiry: &str, cvv: &str) -> CheckoutForm {
        CheckoutForm {
            payment_method: Some("card".to_string()),
            delivery_method: Some("courier".to_string()),
            address: Some("1 Main St".to_string()),
            card_number: Some(number.to_string()),
            card_expiry: Some(expiry.to_string()),
            card_cvv: Some(cvv.to_string()),
            ..CheckoutForm::default()
        }
    }

    #[tokio::test]
    async fn test_budget_scenario() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let x = item(&db, "Lamp", 40).await;
        let y = item(&db, "Chair", 70).await;

        add_to_cart(&db, alice.id, x.id).await.unwrap();
        let (_, y_line) = add_to_cart(&db, alice.id, y.id).await.unwrap();
        assert_eq!(cart_view(&db, alice.id).await.unwrap().total.units(), 110);

        let err = checkout(&db, alice.id, &cash_pickup()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Market(MarketError::InsufficientFunds {
                required: 110,
                available: 100
            })
        ));
        assert_eq!(cart_view(&db, alice.id).await.unwrap().entries.len(), 2);
        assert_eq!(reload_user(&db, alice.id).await.budget, 100);

        remove_line(&db, alice.id, y_line.id).await.unwrap();
        assert_eq!(cart_view(&db, alice.id).await.unwrap().total.units(), 40);

        let report = checkout(&db, alice.id, &cash_pickup()).await.unwrap();

        assert_eq!(report.settled.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.charged.units(), 40);
        assert_eq!(report.summary, "Order placed: paid by cash, pickup at Central.");
        assert_eq!(reload_user(&db, alice.id).await.budget, 60);
        assert_eq!(reload_item(&db, x.id).await.owner_id, Some(alice.id));
        assert!(cart_view(&db, alice.id).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_item_taken_by_other_is_skipped() {
        let db = database().await;
        let alice = user(&db, "alice", 500).await;
        let bob = user(&db, "bob", 500).await;
        let z = item(&db, "Desk", 100).await;
        let w = item(&db, "Mouse", 25).await;

        add_to_cart(&db, alice.id, z.id).await.unwrap();
        add_to_cart(&db, bob.id, z.id).await.unwrap();
        add_to_cart(&db, bob.id, w.id).await.unwrap();

        checkout(&db, alice.id, &cash_pickup()).await.unwrap();
        assert_eq!(reload_item(&db, z.id).await.owner_id, Some(alice.id));

        let report = checkout(&db, bob.id, &cash_pickup()).await.unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].item_id, z.id);
        assert_eq!(report.skipped[0].reason, SkipReason::TakenByOther);
        assert_eq!(report.skipped[0].message(), "Desk is no longer available.");

        assert_eq!(report.settled.len(), 1);
        assert_eq!(report.settled[0].item_id, w.id);
        assert_eq!(reload_user(&db, bob.id).await.budget, 475);
        assert_eq!(reload_item(&db, z.id).await.owner_id, Some(alice.id));
        assert!(cart_view(&db, bob.id).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;

        let err = checkout(&db, alice.id, &cash_pickup()).await.unwrap_err();
        assert!(matches!(err, AppError::Market(MarketError::EmptyCart)));

        let err = checkout_page(&db, alice.id).await.unwrap_err();
        assert!(matches!(err, AppError::Market(MarketError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_invalid_card_leaves_cart() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        for (number, expiry, cvv, field) in [
            ("123", "12/29", "123", "card_number"),
            ("4111111111111111", "13/29", "123", "card_expiry"),
            ("4111111111111111", "12/29", "12", "card_cvv"),
        ] {
            let err = checkout(&db, alice.id, &card_courier(number, expiry, cvv))
                .await
                .unwrap_err();

            match err {
                AppError::Market(MarketError::Validation(v)) => assert_eq!(v.field(), field),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(cart_view(&db, alice.id).await.unwrap().entries.len(), 1);
        assert_eq!(reload_user(&db, alice.id).await.budget, 100);
    }

    #[tokio::test]
    async fn test_card_checkout() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let report = checkout(&db, alice.id, &card_courier("4111 1111 1111 1111", "12/29", "123"))
            .await
            .unwrap();

        assert_eq!(
            report.summary,
            "Order placed: paid by card, courier delivery to 1 Main St."
        );
        assert_eq!(reload_user(&db, alice.id).await.budget, 60);
    }

    #[tokio::test]
    async fn test_missing_pickup_point() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let form = CheckoutForm {
            pickup_point: Some("   ".to_string()),
            ..cash_pickup()
        };

        let err = checkout(&db, alice.id, &form).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Market(MarketError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[tokio::test]
    async fn test_quantity_charged_once_per_line() {
        let db = database().await;
        let alice = user(&db, "alice", 100).await;
        let lamp = item(&db, "Lamp", 40).await;
        add_to_cart(&db, alice.id, lamp.id).await.unwrap();
        add_to_cart(&db, alice.id, lamp.id).await.unwrap();

        let report = checkout(&db, alice.id, &cash_pickup()).await.unwrap();

        assert_eq!(report.charged.units(), 40);
        assert_eq!(reload_user(&db, alice.id).await.budget, 60);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_settle_shared_item_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(market_db::DbConfig::new(dir.path().join("market.db")))
            .await
            .unwrap();

        for round in 0..10 {
            let alice = user(&db, &format!("alice{round}"), 100).await;
            let bob = user(&db, &format!("bob{round}"), 100).await;
            let vase = item(&db, &format!("Vase{round}"), 30).await;
            let lamp = item(&db, &format!("Lamp{round}"), 20).await;

            add_to_cart(&db, alice.id, vase.id).await.unwrap();
            add_to_cart(&db, bob.id, vase.id).await.unwrap();
            add_to_cart(&db, bob.id, lamp.id).await.unwrap();

            let (alice_id, bob_id) = (alice.id, bob.id);
            let (a_db, b_db) = (db.clone(), db.clone());
            let a = tokio::spawn(async move { checkout(&a_db, alice_id, &cash_pickup()).await });
            let b = tokio::spawn(async move { checkout(&b_db, bob_id, &cash_pickup()).await });
            let alice_report = a.await.unwrap().unwrap();
            let bob_report = b.await.unwrap().unwrap();

            let vase_winners = [&alice_report, &bob_report]
                .iter()
                .filter(|report| report.settled.iter().any(|line| line.item_id == vase.id))
                .count();
            let vase_skips = [&alice_report, &bob_report]
                .iter()
                .filter(|report| report.skipped.iter().any(|line| line.item_id == vase.id))
                .count();
            assert_eq!(vase_winners, 1);
            assert_eq!(vase_skips, 1);

            // Bob's other line settles either way
            assert!(bob_report.settled.iter().any(|line| line.item_id == lamp.id));
            assert_eq!(reload_item(&db, lamp.id).await.owner_id, Some(bob.id));

            let owner = reload_item(&db, vase.id).await.owner_id.unwrap();
            let (alice_budget, bob_budget) = (
                reload_user(&db, alice.id).await.budget,
                reload_user(&db, bob.id).await.budget,
            );
            if owner == alice.id {
                assert_eq!((alice_budget, bob_budget), (70, 80));
            } else {
                assert_eq!(owner, bob.id);
                assert_eq!((alice_budget, bob_budget), (100, 50));
            }
        }
    }
}
