//! Signed session tokens and the cookie that carries them.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shelf_http::AppError;
use shelf_kernel::{settings::AuthSettings, AppState};
use time::OffsetDateTime;
use tower_cookies::{
    cookie::{time::Duration, SameSite},
    Cookie, Cookies,
};

use crate::role::Role;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub id: i64,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Sign a token for `user_id` valid for `token_ttl_hours`.
pub fn issue_token(
    settings: &AuthSettings,
    user_id: i64,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        id: user_id,
        role,
        iat: now,
        exp: now + settings.token_ttl_hours * 60 * 60,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims.
pub fn verify_token(
    settings: &AuthSettings,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// HttpOnly, SameSite=Strict cookie holding `token`, living as long as the token.
pub fn session_cookie(settings: &AuthSettings, token: String) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), token))
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::hours(settings.token_ttl_hours))
        .build()
}

/// Identity of the caller, taken from a verified session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            role: claims.role,
        }
    }
}

/// Session cookie first, then `Authorization: Bearer` for non-browser clients.
async fn bearer_or_cookie(parts: &mut Parts, state: &AppState) -> Option<String> {
    if let Ok(cookies) = Cookies::from_request_parts(parts, state).await {
        if let Some(cookie) = cookies.get(&state.settings.auth.cookie_name) {
            return Some(cookie.value().to_string());
        }
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_or_cookie(parts, state).await else {
            return Err(AppError::unauthorized("Unauthorized: No token provided"));
        };

        match verify_token(&state.settings.auth, &token) {
            Ok(claims) => Ok(claims.into()),
            Err(err) => {
                tracing::warn!(error = %err, "rejected session token");
                Err(AppError::forbidden("Forbidden: Invalid or expired token"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            ..AuthSettings::default()
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let token = issue_token(&settings(), 7, Role::Admin).unwrap();
        let claims = verify_token(&settings(), &token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(&settings(), 7, Role::User).unwrap();
        let other = AuthSettings {
            jwt_secret: "another-secret".to_string(),
            ..settings()
        };
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = AuthSettings {
            token_ttl_hours: -2,
            ..settings()
        };
        let token = issue_token(&expired, 7, Role::User).unwrap();
        assert!(verify_token(&settings(), &token).is_err());
    }

    #[test]
    fn test_verify_invalid_token() {
        assert!(verify_token(&settings(), "invalid.token.here").is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie(&settings(), "abc".to_string());
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
    }
}
