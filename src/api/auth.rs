//! Session resolution and password hashing.
//!
//! Session issuance lives in the external auth service; this module only
//! resolves bearer tokens (or the `session_token` cookie set by that service)
//! to a user row. Handlers pick between two extractors: `AuthUser` rejects
//! with 401, `OptionalUser` never rejects.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use sha2::{Digest, Sha256};
use std::convert::Infallible;
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{find_user_by_session, DbPool, User};
use crate::AppState;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash a session token for lookup; only the hash is stored
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the session token from the Authorization header or the
/// `session_token` cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization").and_then(|h| h.to_str().ok()) {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get("session_token")
        .map(|c| c.value().to_string())
}

/// Resolve the request's session, if any, to a user.
///
/// Resolution failures (expired token, database fault) yield `None`; a
/// database fault is logged but never turns an optional-auth endpoint into an
/// error.
pub async fn resolve_session(db: &DbPool, headers: &HeaderMap) -> Option<User> {
    let token = extract_token(headers)?;
    match find_user_by_session(db, &hash_token(&token)).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Session lookup failed: {}", e);
            None
        }
    }
}

/// Extractor for endpoints that require an authenticated user (401 otherwise)
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(&state.db, &parts.headers)
            .await
            .map(AuthUser)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Extractor for endpoints where authentication is optional
pub struct OptionalUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            resolve_session(&state.db, &parts.headers).await,
        ))
    }
}
