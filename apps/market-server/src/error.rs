//! Error types for the HTTP application.
//!
//! ```text
//! MarketError / ValidationError ──► AppError::Market ──► 303 + danger flash
//! missing or bad session        ──► AppError::Unauthenticated ──► /login
//! lock contention (DbError::Busy) ──► AppError::Db ──► 303 + danger flash
//! other DbError, hashing, tokens ──► AppError::{Db, Internal} ──► 500 JSON
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use market_core::checkout::checkout_message;
use market_core::{FlashCategory, MarketError, Outcome, ValidationError};
use market_db::DbError;

use crate::flash::FlashRedirect;

/// Application errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Business rule or form validation failure. Always recoverable.
    #[error(transparent)]
    Market(#[from] MarketError),

    /// No valid session on a route that needs one.
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Market(MarketError::Validation(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Db(DbError::from(err))
    }
}

/// Result type for handlers and services.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn is_empty_cart(&self) -> bool {
        matches!(self, AppError::Market(MarketError::EmptyCart))
    }

    /// Turns a domain failure into a redirect to `to`.
    ///
    /// Lock contention is reported as a retryable failure; other
    /// infrastructure failures are handed back unchanged so they surface as
    /// a 500.
    pub fn recover(self, to: &str) -> AppResult<Outcome> {
        match self {
            AppError::Market(err) => {
                let (category, message) = market_message(&err);
                Ok(Outcome::redirect(to).with(market_core::Flash::new(category, message)))
            }
            AppError::Unauthenticated => Ok(login_required()),
            AppError::Db(err) if err.is_contention() => {
                warn!(error = %err, "Request lost a lock race");
                Ok(Outcome::danger(to, BUSY_MESSAGE))
            }
            other => Err(other),
        }
    }
}

const BUSY_MESSAGE: &str = "The market is busy right now. Please try again.";

/// Redirect used whenever a route needs a session and has none.
pub fn login_required() -> Outcome {
    Outcome::info("/login", "Please log in to access this page.")
}

/// Flash category and text for a domain error.
pub fn market_message(err: &MarketError) -> (FlashCategory, String) {
    match err {
        MarketError::EmptyCart => (FlashCategory::Warning, "Cart is empty.".to_string()),
        MarketError::InsufficientFunds { .. } => (
            FlashCategory::Danger,
            "Not enough budget to complete the purchase.".to_string(),
        ),
        MarketError::Validation(v) => (FlashCategory::Danger, validation_message(v)),
        other => (FlashCategory::Danger, other.to_string()),
    }
}

fn capitalize(field: &str) -> String {
    let words = field.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human text for a form field failure.
pub fn validation_message(err: &ValidationError) -> String {
    match err.field() {
        "payment_method" | "delivery_method" | "pickup_point" | "address" | "card_number"
        | "card_expiry" | "card_cvv" => return checkout_message(err),
        _ => {}
    }

    let field = capitalize(err.field());
    match err {
        ValidationError::Required { .. } => format!("{field} is required."),
        ValidationError::TooShort { min, .. } => {
            format!("{field} must be at least {min} characters.")
        }
        ValidationError::TooLong { max, .. } => {
            format!("{field} must be at most {max} characters.")
        }
        ValidationError::OutOfRange { min, max, .. } => {
            format!("{field} must be between {min} and {max}.")
        }
        ValidationError::MustBePositive { .. } => format!("{field} must be positive."),
        ValidationError::NotNegative { .. } => format!("{field} cannot be negative."),
        ValidationError::InvalidFormat { reason, .. } => format!("{field} {reason}."),
        ValidationError::NotAllowed { allowed, .. } => {
            format!("{field} must be one of: {}.", allowed.join(", "))
        }
        ValidationError::Duplicate { value, .. } => {
            format!("{field} '{value}' already exists! Please try a different one.")
        }
        ValidationError::Mismatch { .. } => "Passwords do not match.".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Market(MarketError::AccessDenied) => {
                FlashRedirect::new(Outcome::danger("/login", "Access denied")).into_response()
            }
            AppError::Market(err) => {
                let (category, message) = market_message(&err);
                FlashRedirect::new(
                    Outcome::redirect("/market").with(market_core::Flash::new(category, message)),
                )
                .into_response()
            }
            AppError::Unauthenticated => FlashRedirect::new(login_required()).into_response(),
            AppError::Db(err) if err.is_contention() => {
                warn!(error = %err, "Request lost a lock race");
                FlashRedirect::new(Outcome::danger("/market", BUSY_MESSAGE)).into_response()
            }
            AppError::Db(err) => {
                error!(error = %err, "Database failure");
                internal_error()
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal failure");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
