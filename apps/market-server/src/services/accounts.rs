//! Account registration, login and administrator bootstrap.

use serde::Deserialize;
use tracing::{info, warn};

use market_core::validation::{validate_email, validate_new_password, validate_username};
use market_core::{Role, User, ValidationError};
use market_db::repository::users;
use market_db::{Database, DbError, NewUser};

use crate::auth::{hash_password, verify_password};
use crate::config::MarketConfig;
use crate::error::{AppError, AppResult};

/// Registration form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

/// Login form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn duplicate(field: &str, value: &str) -> AppError {
    ValidationError::Duplicate {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Maps a unique violation from a racing insert back onto the form field.
fn duplicate_from_db(err: DbError, username: &str, email: &str) -> AppError {
    if err.is_unique_violation_on("users.username") {
        duplicate("username", username)
    } else if err.is_unique_violation_on("users.email") {
        duplicate("email_address", email)
    } else {
        err.into()
    }
}

/// Creates a regular account with the configured starting budget.
///
/// ## Errors
/// * `ValidationError` - bad field, or username / email already registered
pub async fn register(db: &Database, form: &RegisterForm, budget: i64) -> AppResult<User> {
    let username = validate_username(form.username.as_deref())?;
    let email = validate_email(form.email_address.as_deref())?;
    let password = validate_new_password(form.password1.as_deref(), form.password2.as_deref())?;

    let mut tx = db.begin().await?;

    let (username_taken, email_taken) = users::identity_taken(&mut tx, &username, &email).await?;
    if username_taken {
        return Err(duplicate("username", &username));
    }
    if email_taken {
        return Err(duplicate("email_address", &email));
    }

    let new_user = NewUser {
        username: username.clone(),
        email: email.clone(),
        password_hash: hash_password(&password)?,
        budget,
        role: Role::Regular,
    };

    let user = users::insert(&mut tx, &new_user)
        .await
        .map_err(|e| duplicate_from_db(e, &username, &email))?;

    tx.commit().await?;

    info!(user_id = user.id, username = %user.username, "Account registered");
    Ok(user)
}

/// Checks credentials. `None` means they do not match any account.
pub async fn login(db: &Database, form: &LoginForm) -> AppResult<Option<User>> {
    let username = form.username.as_deref().map(str::trim).unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let mut conn = db.acquire().await?;
    let user = match users::find_by_username(&mut conn, username).await? {
        Some(user) => user,
        None => {
            info!(username = %username, "Login failed: unknown user");
            return Ok(None);
        }
    };

    if !verify_password(password, &user.password_hash) {
        info!(user_id = user.id, "Login failed: wrong password");
        return Ok(None);
    }

    info!(user_id = user.id, role = %user.role, "Logged in");
    Ok(Some(user))
}

/// Creates the administrator account on first start.
///
/// Does nothing when no admin password is configured or the username is
/// already registered.
pub async fn bootstrap_admin(db: &Database, config: &MarketConfig) -> AppResult<Option<User>> {
    let password = match &config.admin_password {
        Some(password) => password,
        None => {
            warn!("ADMIN_PASSWORD not set; no administrator account will be created");
            return Ok(None);
        }
    };

    let mut tx = db.begin().await?;

    if let Some(existing) = users::find_by_username(&mut tx, &config.admin_username).await? {
        if !existing.is_admin() {
            warn!(
                username = %existing.username,
                "Configured admin username belongs to a regular account"
            );
        }
        return Ok(None);
    }

    let admin = users::insert(
        &mut tx,
        &NewUser {
            username: config.admin_username.clone(),
            email: config.admin_email.clone(),
            password_hash: hash_password(password)?,
            budget: config.default_budget,
            role: Role::Admin,
        },
    )
    .await?;

    tx.commit().await?;

    info!(user_id = admin.id, username = %admin.username, "Administrator account created");
    Ok(Some(admin))
}

// =============================================================================
// Unit Tests
// =============================================================================
