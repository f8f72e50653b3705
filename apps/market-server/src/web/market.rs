//! Market page and selling items back.

use std::sync::Arc;

use axum::extract::State;
use axum::Form;
use serde::Deserialize;

use market_core::validation::parse_integer;
use market_core::{MarketError, Outcome};

use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::flash::{FlashRedirect, PendingFlashes, View};
use crate::services::market::{market_view, MarketView};
use crate::services::ownership;
use crate::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellForm {
    pub item_id: Option<String>,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    pending: PendingFlashes,
) -> AppResult<View<MarketView>> {
    let view = market_view(&state.db, &user).await?;
    Ok(View::new(pending, view))
}

pub async fn sell(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SellForm>,
) -> AppResult<FlashRedirect> {
    let item_id = match parse_integer("item_id", form.item_id.as_deref()) {
        Ok(id) => id,
        Err(err) => return Ok(AppError::from(err).recover("/market")?.into()),
    };

    let outcome = match ownership::sell_item(&state.db, user.id, item_id).await {
        Ok(item) => Outcome::success(
            "/market",
            format!("Congratulations! You sold {} back to market!", item.name),
        ),
        Err(AppError::Market(MarketError::NotOwner { name })) => Outcome::danger(
            "/market",
            format!("Something went wrong with selling {}!", name),
        ),
        Err(err) => err.recover("/market")?,
    };

    Ok(outcome.into())
}
