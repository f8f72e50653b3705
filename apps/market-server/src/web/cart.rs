//! Cart and checkout handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use market_core::cart::QuantityChange;
use market_core::checkout::{CheckoutForm, CheckoutReport};
use market_core::{Flash, Outcome};

use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::flash::{FlashRedirect, PendingFlashes, View};
use crate::services::cart::{self, CartView};
use crate::services::checkout::{self, CheckoutPage};
use crate::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuantityForm {
    pub quantity: Option<String>,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    pending: PendingFlashes,
) -> AppResult<View<CartView>> {
    let view = cart::cart_view(&state.db, user.id).await?;
    Ok(View::new(pending, view))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<FlashRedirect> {
    let outcome = match cart::add_to_cart(&state.db, user.id, item_id).await {
        Ok((item, _line)) => Outcome::success("/cart", format!("{} added to cart.", item.name)),
        Err(err) => err.recover("/market")?,
    };

    Ok(outcome.into())
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<i64>,
) -> AppResult<FlashRedirect> {
    let outcome = match cart::remove_line(&state.db, user.id, line_id).await {
        Ok(()) => Outcome::info("/cart", "Item removed from cart."),
        Err(err) => err.recover("/cart")?,
    };

    Ok(outcome.into())
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<i64>,
    Form(form): Form<QuantityForm>,
) -> AppResult<FlashRedirect> {
    let outcome =
        match cart::update_quantity(&state.db, user.id, line_id, form.quantity.as_deref()).await {
            Ok(QuantityChange::Remove) => Outcome::info("/cart", "Item removed from cart."),
            Ok(QuantityChange::Set(_)) => Outcome::success("/cart", "Quantity updated."),
            Err(err) => err.recover("/cart")?,
        };

    Ok(outcome.into())
}

pub async fn checkout_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    pending: PendingFlashes,
) -> AppResult<Response> {
    match checkout::checkout_page(&state.db, user.id).await {
        Ok(page) => Ok(View::<CheckoutPage>::new(pending, page).into_response()),
        Err(err) => Ok(FlashRedirect::from(err.recover("/cart")?).into_response()),
    }
}

/// Flashes for a finished checkout: one warning per skipped line, then the
/// order summary.
pub fn report_outcome(report: &CheckoutReport) -> Outcome {
    let mut outcome = Outcome::redirect("/market");

    for skipped in &report.skipped {
        outcome.push(Flash::warning(skipped.message()));
    }
    outcome.push(Flash::success(report.summary.clone()));

    outcome
}

pub async fn checkout_submit(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<CheckoutForm>,
) -> AppResult<FlashRedirect> {
    let outcome = match checkout::checkout(&state.db, user.id, &form).await {
        Ok(report) => report_outcome(&report),
        Err(err) if err.is_empty_cart() => err.recover("/cart")?,
        Err(err) => err.recover("/cart/checkout")?,
    };

    Ok(outcome.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::checkout::SkipReason;
    use market_core::{FlashCategory, Money};

    #[test]
    fn test_report_outcome_flashes() {
        let form = CheckoutForm {
            payment_method: Some("cash".to_string()),
            delivery_method: Some("pickup".to_string()),
            pickup_point: Some("Central".to_string()),
            ..CheckoutForm::default()
        };
        let mut report = CheckoutReport::new(&form.validate().unwrap());
        report.settle(1, "Lamp", Money::from_units(40));
        report.skip(2, "Desk", SkipReason::TakenByOther);

        let outcome = report_outcome(&report);

        assert_eq!(outcome.redirect_to, "/market");
        assert_eq!(outcome.flashes.len(), 2);
        assert_eq!(outcome.flashes[0].category, FlashCategory::Warning);
        assert_eq!(outcome.flashes[0].message, "Desk is no longer available.");
        assert_eq!(outcome.flashes[1].category, FlashCategory::Success);
        assert_eq!(
            outcome.flashes[1].message,
            "Order placed: paid by cash, pickup at Central."
        );
    }
}
