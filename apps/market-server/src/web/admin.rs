//! Admin panel handlers.
//!
//! Every handler takes an [`AdminUser`], so a caller without the admin role
//! is redirected to `/login` before anything is read or written.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;

use market_core::{Item, MarketError, Outcome};

use crate::auth::AdminUser;
use crate::error::{AppError, AppResult};
use crate::flash::{FlashRedirect, PendingFlashes, View};
use crate::services::admin::{self, AdminDashboard, BudgetForm, ItemForm};
use crate::AppState;

/// `GET /admin` has its own wording for callers who are not admins.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    admin: Result<AdminUser, AppError>,
    pending: PendingFlashes,
) -> AppResult<Response> {
    match admin {
        Ok(_) => {
            let dashboard = admin::dashboard(&state.db).await?;
            Ok(View::<AdminDashboard>::new(pending, dashboard).into_response())
        }
        Err(AppError::Market(MarketError::AccessDenied)) => Ok(FlashRedirect::new(
            Outcome::danger("/login", "Please login as admin to access the admin panel!"),
        )
        .into_response()),
        Err(err) => Err(err),
    }
}

pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(item_id): Path<i64>,
) -> AppResult<FlashRedirect> {
    let outcome = match admin::delete_item(&state.db, item_id).await {
        Ok(_) => Outcome::success("/admin", "Item deleted"),
        Err(err) => err.recover("/admin")?,
    };

    Ok(outcome.into())
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(acting): AdminUser,
    Path(user_id): Path<i64>,
) -> AppResult<FlashRedirect> {
    let outcome = match admin::delete_user(&state.db, acting.id, user_id).await {
        Ok(_) => Outcome::success("/admin", "User deleted"),
        Err(AppError::Market(MarketError::AccessDenied)) => {
            Outcome::danger("/admin", "You cannot delete your own account.")
        }
        Err(err) => err.recover("/admin")?,
    };

    Ok(outcome.into())
}

pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<i64>,
    Form(form): Form<BudgetForm>,
) -> AppResult<FlashRedirect> {
    let outcome = match admin::set_budget(&state.db, user_id, form.budget.as_deref()).await {
        Ok(user) => Outcome::success(
            "/admin",
            format!("Budget for {} updated to {} $", user.username, user.budget),
        ),
        Err(err) => err.recover("/admin")?,
    };

    Ok(outcome.into())
}

pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(item_id): Path<i64>,
    pending: PendingFlashes,
) -> AppResult<Response> {
    match admin::item_for_edit(&state.db, item_id).await {
        Ok(item) => Ok(View::<Item>::new(pending, item).into_response()),
        Err(err) => Ok(FlashRedirect::from(err.recover("/admin")?).into_response()),
    }
}

pub async fn edit_submit(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(item_id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> AppResult<FlashRedirect> {
    let outcome = match admin::edit_item(&state.db, item_id, &form).await {
        Ok(_) => Outcome::success("/admin", "Item updated"),
        Err(err) => err.recover(&format!("/admin/item/{item_id}/edit"))?,
    };

    Ok(outcome.into())
}

pub async fn add_page(_admin: AdminUser, pending: PendingFlashes) -> View<()> {
    View::new(pending, ())
}

pub async fn add_submit(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Form(form): Form<ItemForm>,
) -> AppResult<FlashRedirect> {
    let outcome = match admin::create_item(&state.db, &form).await {
        Ok(_) => Outcome::success("/admin", "Item created"),
        Err(err) => err.recover("/admin/item/add")?,
    };

    Ok(outcome.into())
}
