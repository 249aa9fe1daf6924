pub mod auth;
pub mod calendar;
pub mod crews;
pub mod events;
pub mod health;
pub mod organizations;
pub mod users;

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::services::auth::{verify_token, TokenClaims};

/// Resolve the bearer token into claims; every protected handler calls this
/// first.
pub(crate) fn authenticate(headers: &HeaderMap, secret: &str) -> Result<TokenClaims, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    verify_token(secret, token).ok_or(AppError::Unauthorized)
}
