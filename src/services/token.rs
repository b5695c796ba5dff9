use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues a signed token for an account, valid for `ttl_days`.
pub fn issue(account_id: &str, role: Role, secret: &str, ttl_days: i64) -> AppResult<String> {
    let now = Utc::now();
    let expires = TimeDelta::try_days(ttl_days)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "token lifetime of {ttl_days} days is out of range"
            ))
        })?;
    let claims = Claims {
        sub: account_id.to_string(),
        role,
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
}

/// Checks signature and expiry. Any failure is reported as `Unauthorized`.
pub fn verify(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        AppError::Unauthorized
    })
}
