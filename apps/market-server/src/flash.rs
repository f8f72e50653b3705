//! # Flash Messages
//!
//! Carries transient status messages from a mutating request to the next
//! page view.
//!
//! ## Round Trip
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /add_to_cart/7                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  303 See Other                                                          │
//! │  Location: /cart                                                        │
//! │  Set-Cookie: market_flash=success=Lamp+added+to+cart.; Path=/; ...      │
//! │  { "redirect_to": "/cart", "flashes": [...] }                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET /cart  (cookie sent back)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 { "flashes": [...], ...view... }                                   │
//! │  Set-Cookie: market_flash=; Max-Age=0      ← shown once                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cookie value is `application/x-www-form-urlencoded`: one
//! `category=message` pair per flash, in order.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::convert::Infallible;
use url::form_urlencoded;

use market_core::{Flash, FlashCategory, Outcome};

pub const FLASH_COOKIE: &str = "market_flash";

// =============================================================================
// Cookie Codec
// =============================================================================

/// Encodes flashes into a cookie-safe string.
pub fn encode_flashes(flashes: &[Flash]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for flash in flashes {
        serializer.append_pair(flash.category.as_str(), &flash.message);
    }
    serializer.finish()
}

/// Decodes a cookie value; unknown categories are dropped.
pub fn decode_flashes(value: &str) -> Vec<Flash> {
    form_urlencoded::parse(value.as_bytes())
        .filter_map(|(category, message)| {
            category
                .parse::<FlashCategory>()
                .ok()
                .map(|category| Flash::new(category, message.into_owned()))
        })
        .collect()
}

/// Finds a cookie by name across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn set_flash_cookie(flashes: &[Flash]) -> Option<HeaderValue> {
    if flashes.is_empty() {
        return None;
    }

    HeaderValue::from_str(&format!(
        "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        encode_flashes(flashes)
    ))
    .ok()
}

fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("market_flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// =============================================================================
// Redirect Response
// =============================================================================

/// `303 See Other` carrying an [`Outcome`].
///
/// The flashes travel in the `market_flash` cookie; the outcome is also the
/// JSON body so non-browser clients can read it directly.
#[derive(Debug)]
pub struct FlashRedirect {
    pub outcome: Outcome,
    cookies: Vec<HeaderValue>,
}

impl FlashRedirect {
    pub fn new(outcome: Outcome) -> Self {
        FlashRedirect {
            outcome,
            cookies: Vec::new(),
        }
    }

    /// Adds another `Set-Cookie` header (e.g. the session).
    pub fn with_cookie(mut self, cookie: HeaderValue) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl From<Outcome> for FlashRedirect {
    fn from(outcome: Outcome) -> Self {
        FlashRedirect::new(outcome)
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let location = match HeaderValue::from_str(&self.outcome.redirect_to) {
            Ok(value) => value,
            Err(_) => HeaderValue::from_static("/"),
        };

        let flash_cookie = set_flash_cookie(&self.outcome.flashes);
        let mut response = (StatusCode::SEE_OTHER, Json(self.outcome)).into_response();

        let headers = response.headers_mut();
        headers.insert(LOCATION, location);
        if let Some(cookie) = flash_cookie {
            headers.append(SET_COOKIE, cookie);
        }
        for cookie in self.cookies {
            headers.append(SET_COOKIE, cookie);
        }

        response
    }
}

// =============================================================================
// Reading Flashes
// =============================================================================

/// Flashes left by the previous redirect.
#[derive(Debug, Clone, Default)]
pub struct PendingFlashes(pub Vec<Flash>);

impl<S> FromRequestParts<S> for PendingFlashes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flashes = read_cookie(&parts.headers, FLASH_COOKIE)
            .map(decode_flashes)
            .unwrap_or_default();

        Ok(PendingFlashes(flashes))
    }
}

/// JSON page body: pending flashes plus the page's own data.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub flashes: Vec<Flash>,
    pub data: T,
}

/// A `200` JSON view that also consumes the pending flashes.
#[derive(Debug)]
pub struct View<T: Serialize> {
    page: Page<T>,
    clear: bool,
}

impl<T: Serialize> View<T> {
    pub fn new(pending: PendingFlashes, data: T) -> Self {
        let clear = !pending.0.is_empty();
        View {
            page: Page {
                flashes: pending.0,
                data,
            },
            clear,
        }
    }
}

impl<T: Serialize> IntoResponse for View<T> {
    fn into_response(self) -> Response {
        let clear = self.clear;
        let mut response = Json(self.page).into_response();

        if clear {
            response
                .headers_mut()
                .append(SET_COOKIE, clear_flash_cookie());
        }

        response
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_preserves_order_and_text() {
        let flashes = vec![
            Flash::warning("Lamp & Desk; \"special\" = 100%"),
            Flash::success("Order placed: paid by cash, pickup at Central."),
        ];

        let encoded = encode_flashes(&flashes);
        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('"'));

        assert_eq!(decode_flashes(&encoded), flashes);
    }

    #[test]
    fn test_decode_drops_unknown_categories() {
        let flashes = decode_flashes("error=nope&info=Hello");
        assert_eq!(flashes, vec![Flash::info("Hello")]);
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("market_session=abc; market_flash=info=Hi"),
        );

        assert_eq!(read_cookie(&headers, "market_session"), Some("abc"));
        assert_eq!(read_cookie(&headers, FLASH_COOKIE), Some("info=Hi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_redirect_response() {
        let response = FlashRedirect::new(Outcome::success("/cart", "Lamp added to cart."))
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/cart");

        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("market_flash=success=Lamp+added+to+cart."));
    }

    #[test]
    fn test_redirect_without_flash_sets_no_cookie() {
        let response = FlashRedirect::new(Outcome::redirect("/")).into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_view_clears_consumed_flashes() {
        let response = View::new(PendingFlashes(vec![Flash::info("Hi")]), 1_i64).into_response();
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));

        let response = View::new(PendingFlashes::default(), 1_i64).into_response();
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
