//! # Validation Module
//!
//! Form field validation for Bazaar Market.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP form (axum Form<T>)                                     │
//! │  └── Every field arrives as Option<String>, never rejected by serde    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Integer parsing (budget, price, quantity)                         │
//! │  ├── Account fields (username, email, password)                        │
//! │  ├── Item fields (name, barcode, description)                          │
//! │  └── Card shape checks (number, MM/YY expiry, CVV)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (username, email, barcode, user+item)                      │
//! │  └── CHECK (budget >= 0, price >= 0, quantity >= 1)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed numbers never panic: they come back as
//! [`ValidationError::InvalidFormat`].
//!
//! ## Usage
//! ```rust
//! use market_core::validation::{parse_integer, validate_budget};
//!
//! let budget = parse_integer("budget", Some("250")).unwrap();
//! assert!(validate_budget(budget).is_ok());
//! assert!(parse_integer("budget", Some("lots")).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_AMOUNT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const USERNAME_MIN: usize = 2;
pub const USERNAME_MAX: usize = 30;
pub const EMAIL_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const ITEM_NAME_MAX: usize = 30;
pub const BARCODE_MAX: usize = 12;
pub const DESCRIPTION_MAX: usize = 1024;

/// Reason given when an expiry has no `/` separator at all.
pub const EXPIRY_FORMAT_REASON: &str = "must be in MM/YY format";
/// Reason given when an expiry has the separator but a bad month or year.
pub const EXPIRY_DATE_REASON: &str = "must be a valid MM/YY date";

// =============================================================================
// Generic Helpers
// =============================================================================

/// Returns the trimmed value of a required text field.
pub fn required_text(field: &str, raw: Option<&str>) -> ValidationResult<String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Parses an integer form field.
///
/// ## Rules
/// - Missing or blank → `Required`
/// - Anything `i64::from_str` rejects → `InvalidFormat`
///
/// ## Example
/// ```rust
/// use market_core::validation::parse_integer;
///
/// assert_eq!(parse_integer("quantity", Some(" 3 ")).unwrap(), 3);
/// assert_eq!(parse_integer("quantity", Some("-2")).unwrap(), -2);
/// assert!(parse_integer("quantity", Some("2.5")).is_err());
/// assert!(parse_integer("quantity", None).is_err());
/// ```
pub fn parse_integer(field: &str, raw: Option<&str>) -> ValidationResult<i64> {
    let value = required_text(field, raw)?;

    value.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be an integer number".to_string(),
    })
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let len = value.chars().count();

    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn is_ascii_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a username and returns it trimmed.
///
/// ## Rules
/// - Between 2 and 30 characters
pub fn validate_username(raw: Option<&str>) -> ValidationResult<String> {
    let username = required_text("username", raw)?;
    check_length("username", &username, USERNAME_MIN, USERNAME_MAX)?;
    Ok(username)
}

/// Validates an email address shape and returns it trimmed.
///
/// ## Rules
/// - At most 50 characters, no whitespace
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
pub fn validate_email(raw: Option<&str>) -> ValidationResult<String> {
    let email = required_text("email_address", raw)?;
    check_length("email_address", &email, 3, EMAIL_MAX)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email_address".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !host.starts_with('.') => {
            Ok(email)
        }
        _ => Err(invalid()),
    }
}

/// Validates a new password and its confirmation.
pub fn validate_new_password(
    password: Option<&str>,
    confirmation: Option<&str>,
) -> ValidationResult<String> {
    let password = password.unwrap_or_default();
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password1".to_string(),
        });
    }

    if password.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::TooShort {
            field: "password1".to_string(),
            min: PASSWORD_MIN,
        });
    }

    if confirmation != Some(password) {
        return Err(ValidationError::Mismatch {
            field: "password2".to_string(),
            other: "password1".to_string(),
        });
    }

    Ok(password.to_string())
}

// =============================================================================
// Item Validators
// =============================================================================

/// Validates an item name.
pub fn validate_item_name(raw: Option<&str>) -> ValidationResult<String> {
    let name = required_text("name", raw)?;
    check_length("name", &name, 1, ITEM_NAME_MAX)?;
    Ok(name)
}

/// Validates a barcode.
///
/// ## Rules
/// - 1 to 12 characters
/// - Letters and digits only
pub fn validate_barcode(raw: Option<&str>) -> ValidationResult<String> {
    let barcode = required_text("barcode", raw)?;
    check_length("barcode", &barcode, 1, BARCODE_MAX)?;

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(barcode)
}

/// Validates an item description.
pub fn validate_description(raw: Option<&str>) -> ValidationResult<String> {
    let description = required_text("description", raw)?;
    check_length("description", &description, 1, DESCRIPTION_MAX)?;
    Ok(description)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a budget set by an administrator.
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_budget;
///
/// assert!(validate_budget(0).is_ok());
/// assert!(validate_budget(-5).is_err());
/// ```
pub fn validate_budget(budget: i64) -> ValidationResult<()> {
    validate_amount("budget", budget)
}

/// Validates an item price. Zero is allowed (free items).
pub fn validate_price(price: i64) -> ValidationResult<()> {
    validate_amount("price", price)
}

fn validate_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::NotNegative {
            field: field.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

// =============================================================================
// Card Validators
// =============================================================================
// Shape checks only; nothing is ever charged.

/// Validates a card number and returns it with spaces removed.
///
/// ## Rules
/// - Spaces are ignored
/// - Digits only, 13 to 19 of them
///
/// ## Example
/// ```rust
/// use market_core::validation::validate_card_number;
///
/// assert_eq!(validate_card_number(Some("4111 1111 1111 1111")).unwrap(), "4111111111111111");
/// assert!(validate_card_number(Some("123")).is_err());
/// ```
pub fn validate_card_number(raw: Option<&str>) -> ValidationResult<String> {
    let number = required_text("card_number", raw)?.replace(' ', "");

    if !is_ascii_digits(&number) || !(13..=19).contains(&number.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "card_number".to_string(),
            reason: "must be 13 to 19 digits".to_string(),
        });
    }

    Ok(number)
}

/// Validates a card expiry in `MM/YY` form and returns `(month, year)`.
///
/// ## Rules
/// - Two-digit month between 01 and 12
/// - Two-digit year
pub fn validate_card_expiry(raw: Option<&str>) -> ValidationResult<(u8, u8)> {
    let expiry = required_text("card_expiry", raw)?;

    let (month, year) = expiry
        .split_once('/')
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "card_expiry".to_string(),
            reason: EXPIRY_FORMAT_REASON.to_string(),
        })?;

    let invalid = || ValidationError::InvalidFormat {
        field: "card_expiry".to_string(),
        reason: EXPIRY_DATE_REASON.to_string(),
    };

    if month.len() != 2 || !is_ascii_digits(month) || year.len() != 2 || !is_ascii_digits(year) {
        return Err(invalid());
    }

    let month: u8 = month.parse().map_err(|_| invalid())?;
    let year: u8 = year.parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((month, year))
}

/// Validates a card CVV: 3 or 4 digits.
pub fn validate_cvv(raw: Option<&str>) -> ValidationResult<String> {
    let cvv = required_text("card_cvv", raw)?;

    if !is_ascii_digits(&cvv) || !(3..=4).contains(&cvv.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "card_cvv".to_string(),
            reason: "must be 3 or 4 digits".to_string(),
        });
    }

    Ok(cvv)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("budget", Some("250")).unwrap(), 250);
        assert_eq!(parse_integer("budget", Some("-5")).unwrap(), -5);

        assert!(matches!(
            parse_integer("budget", Some("abc")),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_integer("budget", Some("   ")),
            Err(ValidationError::Required { .. })
        ));
        assert!(parse_integer("budget", Some("1e3")).is_err());
        assert!(parse_integer("budget", Some("99999999999999999999")).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(Some("  alice ")).unwrap(), "alice");
        assert!(validate_username(Some("a")).is_err());
        assert!(validate_username(Some(&"a".repeat(31))).is_err());
        assert!(validate_username(None).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(Some("alice@example.com")).is_ok());
        assert!(validate_email(Some("a.b@mail.co.uk")).is_ok());

        assert!(validate_email(Some("alice")).is_err());
        assert!(validate_email(Some("@example.com")).is_err());
        assert!(validate_email(Some("alice@example")).is_err());
        assert!(validate_email(Some("alice@.com")).is_err());
        assert!(validate_email(Some("al ice@example.com")).is_err());
        assert!(validate_email(Some("a@b@example.com")).is_err());
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password(Some("secret1"), Some("secret1")).is_ok());
        assert!(matches!(
            validate_new_password(Some("abc"), Some("abc")),
            Err(ValidationError::TooShort { .. })
        ));
        assert!(matches!(
            validate_new_password(Some("secret1"), Some("secret2")),
            Err(ValidationError::Mismatch { .. })
        ));
        assert!(validate_new_password(None, None).is_err());
    }

    #[test]
    fn test_item_fields() {
        assert!(validate_item_name(Some("Desk Lamp")).is_ok());
        assert!(validate_item_name(Some("")).is_err());
        assert!(validate_item_name(Some(&"x".repeat(31))).is_err());

        assert!(validate_barcode(Some("123456789012")).is_ok());
        assert!(validate_barcode(Some("1234567890123")).is_err());
        assert!(validate_barcode(Some("12-34")).is_err());

        assert!(validate_description(Some("A lamp")).is_ok());
        assert!(validate_description(Some(" ")).is_err());
    }

    #[test]
    fn test_validate_budget_and_price() {
        assert!(validate_budget(0).is_ok());
        assert!(validate_budget(100).is_ok());
        assert!(validate_budget(-5).is_err());

        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
    }

    #[test]
    fn test_amount_ceiling() {
        assert!(validate_price(MAX_AMOUNT).is_ok());
        assert_eq!(
            validate_price(i64::MAX / 2 + 1),
            Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: MAX_AMOUNT,
            })
        );
        assert!(validate_budget(MAX_AMOUNT + 1).is_err());
    }

    #[test]
    fn test_card_number() {
        assert!(validate_card_number(Some("4111111111111111")).is_ok());
        assert!(validate_card_number(Some("4111 1111 1111 1")).is_ok());
        assert!(validate_card_number(Some("123")).is_err());
        assert!(validate_card_number(Some("4111-1111-1111-1111")).is_err());
        assert!(validate_card_number(Some(&"4".repeat(20))).is_err());
        assert!(validate_card_number(None).is_err());
    }

    #[test]
    fn test_card_expiry() {
        assert_eq!(validate_card_expiry(Some("12/29")).unwrap(), (12, 29));
        assert_eq!(validate_card_expiry(Some("01/00")).unwrap(), (1, 0));

        assert!(validate_card_expiry(Some("13/29")).is_err());
        assert!(validate_card_expiry(Some("00/29")).is_err());
        assert!(validate_card_expiry(Some("1/29")).is_err());
        assert!(validate_card_expiry(Some("12/2029")).is_err());
        assert!(validate_card_expiry(Some("1229")).is_err());
        assert!(validate_card_expiry(Some("ab/cd")).is_err());
    }

    #[test]
    fn test_cvv() {
        assert!(validate_cvv(Some("123")).is_ok());
        assert!(validate_cvv(Some("1234")).is_ok());
        assert!(validate_cvv(Some("12")).is_err());
        assert!(validate_cvv(Some("12345")).is_err());
        assert!(validate_cvv(Some("12a")).is_err());
    }
}
