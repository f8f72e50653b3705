//! # Error Types
//!
//! Domain-specific error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  ├── MarketError      - Business rule violations                       │
//! │  └── ValidationError  - Malformed form fields                          │
//! │                                                                         │
//! │  market-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  market-server errors (in app)                                         │
//! │  └── AppError         - Redirect + flash, or 500                       │
//! │                                                                         │
//! │  Flow: ValidationError → MarketError → AppError → Outcome              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal. Every variant is recovered at the request
//! boundary and turned into a human-readable flash message.

use thiserror::Error;

// =============================================================================
// Market Error
// =============================================================================

/// Marketplace business rule violations.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Item already has an owner.
    ///
    /// ## When This Occurs
    /// - Adding an owned item to a cart
    /// - Buying an item someone else bought between cart and checkout
    #[error("{name} is already owned by someone")]
    Unavailable { name: String },

    /// Seller does not own the item.
    #[error("You do not own {name}")]
    NotOwner { name: String },

    /// Budget does not cover the amount.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart total: 110, budget: 100
    ///      │
    ///      ▼
    /// InsufficientFunds { required: 110, available: 100 }
    ///      │
    ///      ▼
    /// Checkout form shows: "Not enough budget to complete the purchase."
    /// ```
    #[error("Not enough budget to complete the purchase (required {required}, available {available})")]
    InsufficientFunds { required: i64, available: i64 },

    /// Caller may not touch this resource.
    #[error("Access denied")]
    AccessDenied,

    /// Checkout attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Entity lookup by id failed.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A total or budget would not fit in `Money`.
    #[error("Amount is too large")]
    AmountTooLarge,

    /// Malformed form input.
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl MarketError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        MarketError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, itemized per field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value cannot be negative.
    #[error("{field} cannot be negative")]
    NotNegative { field: String },

    /// Invalid format (e.g., non-integer number, bad card expiry).
    #[error("{field} is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., username already taken).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Two fields that must agree do not.
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::NotNegative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. }
            | ValidationError::Mismatch { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with MarketError.
pub type CoreResult<T> = Result<T, MarketError>;

// =============================================================================
// Unit Tests
// =============================================================================
