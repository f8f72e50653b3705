//! Landing page, registration, login and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::Form;
use serde::Serialize;
use ts_rs::TS;

use market_core::{Outcome, Role, User};

use crate::auth::{clear_session_cookie, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::flash::{FlashRedirect, PendingFlashes, View};
use crate::services::accounts::{self, LoginForm, RegisterForm};
use crate::AppState;

/// Who is looking at the landing page, if anyone.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct HomePage {
    pub username: Option<String>,
    pub role: Option<Role>,
}

pub async fn home(
    pending: PendingFlashes,
    caller: Result<CurrentUser, AppError>,
) -> View<HomePage> {
    let user = caller.ok().map(|CurrentUser(user)| user);

    View::new(
        pending,
        HomePage {
            username: user.as_ref().map(|u| u.username.clone()),
            role: user.map(|u| u.role),
        },
    )
}

pub async fn register_page(pending: PendingFlashes) -> View<()> {
    View::new(pending, ())
}

pub async fn login_page(pending: PendingFlashes) -> View<()> {
    View::new(pending, ())
}

/// Starts a session for `user` and redirects with `outcome`.
fn signed_in(state: &AppState, user: &User, outcome: Outcome) -> AppResult<FlashRedirect> {
    let token = state.jwt.generate_token(user)?;
    let cookie = state.jwt.session_cookie(&token)?;

    Ok(FlashRedirect::new(outcome).with_cookie(cookie))
}

pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> AppResult<FlashRedirect> {
    match accounts::register(&state.db, &form, state.config.default_budget).await {
        Ok(user) => {
            let outcome = Outcome::success(
                "/market",
                format!(
                    "Account created successfully! You are now logged in as: {}",
                    user.username
                ),
            );
            signed_in(&state, &user, outcome)
        }
        Err(err) => Ok(err.recover("/register")?.into()),
    }
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> AppResult<FlashRedirect> {
    match accounts::login(&state.db, &form).await? {
        Some(user) => {
            let target = if user.is_admin() { "/admin" } else { "/market" };
            let outcome = Outcome::success(
                target,
                format!("Success! You are logged in as: {}", user.username),
            );
            signed_in(&state, &user, outcome)
        }
        None => Ok(Outcome::danger(
            "/login",
            "Username and password are not match! Please try again",
        )
        .into()),
    }
}

pub async fn logout() -> FlashRedirect {
    FlashRedirect::new(Outcome::info("/", "You have been logged out!")).with_cookie(clear_session_cookie())
}
