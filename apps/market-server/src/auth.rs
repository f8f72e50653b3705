//! Session authentication module.
//!
//! Handles password hashing, session token generation and validation, and
//! the request extractors that resolve the caller.
//!
//! ```text
//! Cookie: market_session=<jwt>   or   Authorization: Bearer <jwt>
//!        │
//!        ▼
//! JwtManager::validate_token ──► Claims { sub = user id }
//!        │
//!        ▼
//! users::find_by_id (fresh row) ──► CurrentUser / AdminUser
//! ```
//!
//! Role and existence always come from the stored row; the token only names
//! the account.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use market_core::{MarketError, User};
use market_db::repository::users;

use crate::error::{AppError, AppResult};
use crate::flash::read_cookie;
use crate::AppState;

pub const SESSION_COOKIE: &str = "market_session";

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password for storage.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Session Tokens
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Username at login time, for logs only
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Session token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Generate a session token for `user`.
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "Rejected session token");
            AppError::Unauthenticated
        })?;

        Ok(token_data.claims)
    }

    /// `Set-Cookie` value that starts a session.
    pub fn session_cookie(&self, token: &str) -> AppResult<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.lifetime_secs
        ))
        .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))
    }
}

/// `Set-Cookie` value that ends a session.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("market_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Session token from the cookie, else from a bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    read_cookie(headers, SESSION_COOKIE)
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(extract_bearer_token)
        })
}

// =============================================================================
// Extractors
// =============================================================================

/// The logged-in caller, freshly loaded from the store.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthenticated)?;
        let claims = state.jwt.validate_token(token)?;
        let user_id = claims.user_id().ok_or(AppError::Unauthenticated)?;

        let mut conn = state.db.acquire().await?;
        let user = users::find_by_id(&mut conn, user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// A caller whose stored role is `Admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(|err| match err {
                AppError::Unauthenticated => AppError::Market(MarketError::AccessDenied),
                other => other,
            })?;

        if !user.is_admin() {
            warn!(user_id = user.id, path = %parts.uri.path(), "Rejected admin access");
            return Err(MarketError::AccessDenied.into());
        }

        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use market_core::Role;

    fn user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            budget: 100,
            role: Role::Regular,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_token(&user()).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("one".to_string(), 3600)
            .generate_token(&user())
            .unwrap();

        let result = JwtManager::new("two".to_string(), 3600).validate_token(&token);
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = JwtManager::new("test-secret".to_string(), -3600);
        let token = manager.generate_token(&user()).unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_session_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&headers), Some("from-header"));

        headers.insert(COOKIE, HeaderValue::from_static("market_session=from-cookie"));
        assert_eq!(session_token(&headers), Some("from-cookie"));
    }

    #[test]
    fn test_session_cookie() {
        let manager = JwtManager::new("test-secret".to_string(), 60);
        let cookie = manager.session_cookie("abc").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("market_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
    }
}
