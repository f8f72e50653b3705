//! # Checkout Input and Reports
//!
//! Turns the raw checkout form into a validated [`CheckoutRequest`] and
//! describes what a settled checkout did.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  1. LOAD         cart lines          ── none ──────► EmptyCart          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. VALIDATE     CheckoutForm::validate() ── bad ──► ValidationError    │
//! │        │         payment ∈ {cash, card}                                 │
//! │        │         delivery ∈ {pickup, courier} + point / address         │
//! │        │         card: number, MM/YY, CVV (shape only)                  │
//! │        ▼                                                                │
//! │  3. BUDGET       budget ≥ cart total  ── no ───────► InsufficientFunds  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  4. SETTLE       per line: buy, or skip if taken  ─► CheckoutReport     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  5. FINALIZE     clear cart, commit, flash summary                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1, 3, 4 and 5 need the store and live in the server's checkout
//! service. This module owns step 2 and the report types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_card_expiry, validate_card_number, validate_cvv, EXPIRY_FORMAT_REASON,
};

// =============================================================================
// Payment & Delivery Methods
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid on pickup or to the courier.
    Cash,
    /// Card details collected but never charged.
    Card,
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: vec!["cash".to_string(), "card".to_string()],
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Courier,
}

impl FromStr for DeliveryMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(DeliveryMethod::Pickup),
            "courier" => Ok(DeliveryMethod::Courier),
            _ => Err(ValidationError::NotAllowed {
                field: "delivery_method".to_string(),
                allowed: vec!["pickup".to_string(), "courier".to_string()],
            }),
        }
    }
}

// =============================================================================
// Validated Request
// =============================================================================

/// Card data kept after validation. The full number and CVV are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CardDetails {
    pub last4: String,
    pub expiry_month: u8,
    pub expiry_year: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Payment {
    Cash,
    Card(CardDetails),
}

impl Payment {
    pub fn method(&self) -> PaymentMethod {
        match self {
            Payment::Cash => PaymentMethod::Cash,
            Payment::Card(_) => PaymentMethod::Card,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Delivery {
    Pickup { point: String },
    Courier { address: String },
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Pickup { point } => write!(f, "pickup at {point}"),
            Delivery::Courier { address } => write!(f, "courier delivery to {address}"),
        }
    }
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub payment: Payment,
    pub delivery: Delivery,
}

impl CheckoutRequest {
    /// Human-readable confirmation shown after a successful checkout.
    ///
    /// ## Example
    /// ```rust
    /// use market_core::checkout::{CheckoutRequest, Delivery, Payment};
    ///
    /// let request = CheckoutRequest {
    ///     payment: Payment::Cash,
    ///     delivery: Delivery::Pickup { point: "Central".to_string() },
    /// };
    /// assert_eq!(request.summary(), "Order placed: paid by cash, pickup at Central.");
    /// ```
    pub fn summary(&self) -> String {
        let paid = match self.payment.method() {
            PaymentMethod::Cash => "by cash",
            PaymentMethod::Card => "by card",
        };

        format!("Order placed: paid {paid}, {}.", self.delivery)
    }
}

// =============================================================================
// Raw Form
// =============================================================================

/// The checkout form exactly as submitted.
///
/// Every field is optional so a malformed submission reaches
/// [`CheckoutForm::validate`] instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub payment_method: Option<String>,
    pub delivery_method: Option<String>,
    pub pickup_point: Option<String>,
    pub address: Option<String>,
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub card_cvv: Option<String>,
}

fn non_blank(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

impl CheckoutForm {
    /// Validates the form, stopping at the first bad field.
    ///
    /// Order: payment method, delivery method, pickup point or address,
    /// then card number, expiry and CVV when paying by card. Fields that do
    /// not apply to the chosen methods are ignored.
    pub fn validate(&self) -> Result<CheckoutRequest, ValidationError> {
        let payment_method: PaymentMethod =
            non_blank("payment_method", self.payment_method.as_deref())
                .map_err(|_| not_allowed_payment())?
                .parse()?;

        let delivery_method: DeliveryMethod =
            non_blank("delivery_method", self.delivery_method.as_deref())
                .map_err(|_| not_allowed_delivery())?
                .parse()?;

        let delivery = match delivery_method {
            DeliveryMethod::Pickup => Delivery::Pickup {
                point: non_blank("pickup_point", self.pickup_point.as_deref())?,
            },
            DeliveryMethod::Courier => Delivery::Courier {
                address: non_blank("address", self.address.as_deref())?,
            },
        };

        let payment = match payment_method {
            PaymentMethod::Cash => Payment::Cash,
            PaymentMethod::Card => {
                let number = validate_card_number(self.card_number.as_deref())?;
                let (expiry_month, expiry_year) =
                    validate_card_expiry(self.card_expiry.as_deref())?;
                validate_cvv(self.card_cvv.as_deref())?;

                Payment::Card(CardDetails {
                    last4: number[number.len() - 4..].to_string(),
                    expiry_month,
                    expiry_year,
                })
            }
        };

        Ok(CheckoutRequest { payment, delivery })
    }
}

fn not_allowed_payment() -> ValidationError {
    ValidationError::NotAllowed {
        field: "payment_method".to_string(),
        allowed: vec!["cash".to_string(), "card".to_string()],
    }
}

fn not_allowed_delivery() -> ValidationError {
    ValidationError::NotAllowed {
        field: "delivery_method".to_string(),
        allowed: vec!["pickup".to_string(), "courier".to_string()],
    }
}

/// The message a shopper sees for a checkout validation failure.
pub fn checkout_message(err: &ValidationError) -> String {
    match (err.field(), err) {
        ("payment_method", _) => "Choose payment method.".to_string(),
        ("delivery_method", _) => "Choose delivery method.".to_string(),
        ("pickup_point", _) => "Choose pickup point.".to_string(),
        ("address", _) => "Enter delivery address.".to_string(),
        ("card_number", ValidationError::Required { .. }) => {
            "Please enter card number.".to_string()
        }
        ("card_number", _) => "Card number is invalid.".to_string(),
        ("card_expiry", ValidationError::Required { .. }) => {
            "Enter card expiry in MM/YY format.".to_string()
        }
        ("card_expiry", ValidationError::InvalidFormat { reason, .. })
            if reason == EXPIRY_FORMAT_REASON =>
        {
            "Enter card expiry in MM/YY format.".to_string()
        }
        ("card_expiry", _) => "Card expiry date is invalid.".to_string(),
        ("card_cvv", _) => "CVV is invalid.".to_string(),
        _ => err.to_string(),
    }
}

// =============================================================================
// Checkout Report
// =============================================================================

/// A cart line that became a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettledLine {
    pub item_id: i64,
    pub name: String,
    /// Amount debited for this line.
    pub charged: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another user bought the item after it was carted.
    TakenByOther,
}

/// A cart line that was dropped instead of bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkippedLine {
    pub item_id: i64,
    pub name: String,
    pub reason: SkipReason,
}

impl SkippedLine {
    pub fn message(&self) -> String {
        match self.reason {
            SkipReason::TakenByOther => format!("{} is no longer available.", self.name),
        }
    }
}

/// Result of a completed checkout: partial fulfillment is explicit here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutReport {
    pub settled: Vec<SettledLine>,
    pub skipped: Vec<SkippedLine>,
    pub charged: Money,
    pub summary: String,
}

impl CheckoutReport {
    pub fn new(request: &CheckoutRequest) -> Self {
        CheckoutReport {
            settled: Vec::new(),
            skipped: Vec::new(),
            charged: Money::zero(),
            summary: request.summary(),
        }
    }

    pub fn settle(&mut self, item_id: i64, name: impl Into<String>, charged: Money) {
        self.charged += charged;
        self.settled.push(SettledLine {
            item_id,
            name: name.into(),
            charged,
        });
    }

    pub fn skip(&mut self, item_id: i64, name: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedLine {
            item_id,
            name: name.into(),
            reason,
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
