use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::models::{Role, User};

const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

fn sign(secret: &str, data: &str) -> anyhow::Result<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
        .context("failed to initialize token signer")?;
    mac.update(data.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Issue a signed bearer token: base64(claims) + "." + base64(hmac).
pub fn issue_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = TokenClaims {
        sub: user.id.clone(),
        role: user.role,
        exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).context("failed to encode claims")?);
    let signature = sign(secret, &payload)?;
    Ok(format!("{payload}.{signature}"))
}

/// Verify signature and expiry; returns the claims on success.
pub fn verify_token(secret: &str, token: &str) -> Option<TokenClaims> {
    let (payload, signature) = token.split_once('.')?;

    let expected = sign(secret, payload).ok()?;
    if expected != signature {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;

    if claims.exp <= Utc::now().timestamp() {
        return None;
    }
    Some(claims)
}

/// Salted HMAC password digest, stored as "salt$digest".
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = sign(&salt, password)?;
    Ok(format!("{salt}${digest}"))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    match sign(salt, password) {
        Ok(expected) => expected == digest,
        Err(_) => false,
    }
}

pub fn is_strong_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
