//! # Outcome Model
//!
//! What a mutating operation tells the shopper: where to go next and which
//! transient messages to show there.
//!
//! ```text
//! Outcome {
//!     redirect_to: "/market",
//!     flashes: [ Flash { category: Success, message: "Lamp added to cart." } ],
//! }
//! ```
//!
//! The presentation layer decides how flashes look; this crate only fixes
//! their categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FlashCategory {
    Success,
    Danger,
    Info,
    Warning,
}

impl FlashCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Danger => "danger",
            FlashCategory::Info => "info",
            FlashCategory::Warning => "warning",
        }
    }
}

impl fmt::Display for FlashCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlashCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(FlashCategory::Success),
            "danger" => Ok(FlashCategory::Danger),
            "info" => Ok(FlashCategory::Info),
            "warning" => Ok(FlashCategory::Warning),
            _ => Err(()),
        }
    }
}

/// One transient status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
        Flash {
            category,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Flash::new(FlashCategory::Success, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Flash::new(FlashCategory::Danger, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Flash::new(FlashCategory::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Flash::new(FlashCategory::Warning, message)
    }
}

/// Redirect target plus the flashes to show after following it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Outcome {
    pub redirect_to: String,
    pub flashes: Vec<Flash>,
}

impl Outcome {
    /// A redirect with no message.
    pub fn redirect(to: impl Into<String>) -> Self {
        Outcome {
            redirect_to: to.into(),
            flashes: Vec::new(),
        }
    }

    /// Adds a flash, builder style.
    pub fn with(mut self, flash: Flash) -> Self {
        self.flashes.push(flash);
        self
    }

    pub fn push(&mut self, flash: Flash) {
        self.flashes.push(flash);
    }

    pub fn success(to: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::redirect(to).with(Flash::success(message))
    }

    pub fn danger(to: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::redirect(to).with(Flash::danger(message))
    }

    pub fn info(to: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::redirect(to).with(Flash::info(message))
    }

    pub fn warning(to: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::redirect(to).with(Flash::warning(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let outcome = Outcome::success("/market", "Done")
            .with(Flash::warning("Lamp is no longer available."));

        assert_eq!(outcome.redirect_to, "/market");
        assert_eq!(outcome.flashes.len(), 2);
        assert_eq!(outcome.flashes[0].category, FlashCategory::Success);
        assert_eq!(outcome.flashes[1].category, FlashCategory::Warning);
    }

    #[test]
    fn test_category_round_trip_through_str() {
        for category in [
            FlashCategory::Success,
            FlashCategory::Danger,
            FlashCategory::Info,
            FlashCategory::Warning,
        ] {
            assert_eq!(category.as_str().parse::<FlashCategory>(), Ok(category));
        }
        assert!("error".parse::<FlashCategory>().is_err());
    }

    #[test]
    fn test_serialization() {
        let outcome = Outcome::danger("/login", "Access denied");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["redirect_to"], "/login");
        assert_eq!(json["flashes"][0]["category"], "danger");
    }
}
