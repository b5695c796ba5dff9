use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::Json;

use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, Envelope, Role};
use crate::services::token;
use crate::state::AppState;

/// The account identified by a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub id: String,
    pub role: Role,
}

impl AuthAccount {
    pub fn is(&self, role: Role, id: &str) -> bool {
        self.role == role && self.id == id
    }

    /// Only the account itself may change or delete its record.
    pub fn require_self(&self, role: Role, id: &str) -> AppResult<()> {
        if self.is(role, id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Not allowed to modify another account".to_string(),
            ))
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = token::verify(token, &state.config.jwt_secret)?;
        Ok(AuthAccount {
            id: claims.sub,
            role: claims.role,
        })
    }
}

pub fn issue_token(state: &AppState, id: &str, role: Role) -> AppResult<String> {
    token::issue(id, role, &state.config.jwt_secret, state.config.token_ttl_days)
}

// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
) -> AppResult<Json<Envelope<Account>>> {
    let account = {
        let db = state.db()?;
        match auth.role {
            Role::User => queries::get_user(&db, &auth.id)?.map(Account::User),
            Role::Company => queries::get_company(&db, &auth.id)?.map(Account::Company),
        }
    };

    // A token can outlive the account it was issued for.
    let account = account.ok_or(AppError::Unauthorized)?;
    Ok(Json(Envelope::data(account)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn require_self_checks_role_and_id() {
        let auth = AuthAccount {
            id: "c1".to_string(),
            role: Role::Company,
        };
        assert!(auth.require_self(Role::Company, "c1").is_ok());
        assert!(auth.require_self(Role::User, "c1").is_err());
        assert!(auth.require_self(Role::Company, "c2").is_err());
    }
}
