use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::auth::{issue_token, AuthAccount};
use super::ApiJson;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::fields::normalize_email;
use crate::models::{AuthPayload, Envelope, LoginRequest, NewUser, Role, User, UserUpdate};
use crate::services::credentials;
use crate::state::AppState;

// POST /api/users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewUser>,
) -> AppResult<(StatusCode, Json<Envelope<AuthPayload<User>>>)> {
    let valid = body.validate()?;

    {
        let db = state.db()?;
        if queries::user_email_taken(&db, &valid.email, None)? {
            return Err(AppError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }
    }

    let password_hash = credentials::hash(valid.password).await?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: valid.name,
        email: valid.email,
        password_hash,
        phone: valid.phone,
        role: Role::User,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db()?;
        queries::insert_user(&db, &user)?;
    }
    tracing::info!(id = %user.id, "user registered");

    let token = issue_token(&state, &user.id, Role::User)?;
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::data(AuthPayload {
                account: user,
                token,
            })
            .with_message("User registered successfully"),
        ),
    ))
}

// POST /api/users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<Envelope<AuthPayload<User>>>> {
    let user = {
        let db = state.db()?;
        queries::find_user_by_email(&db, &normalize_email(&body.email))?
    };
    let user = user.ok_or(AppError::InvalidCredentials)?;

    if !credentials::verify(body.password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }
    tracing::info!(id = %user.id, "user logged in");

    let token = issue_token(&state, &user.id, Role::User)?;
    Ok(Json(
        Envelope::data(AuthPayload {
            account: user,
            token,
        })
        .with_message("Login successful"),
    ))
}

// GET /api/users
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Envelope<Vec<User>>>> {
    let users = {
        let db = state.db()?;
        queries::list_users(&db)?
    };
    Ok(Json(Envelope::list(users)))
}

// GET /api/users/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<User>>> {
    let user = {
        let db = state.db()?;
        queries::get_user(&db, &id)?
    };
    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(Envelope::data(user)))
}

// PUT /api/users/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserUpdate>,
) -> AppResult<Json<Envelope<User>>> {
    auth.require_self(Role::User, &id)?;
    let changes = body.validate()?;

    let mut user = {
        let db = state.db()?;
        let user = queries::get_user(&db, &id)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(email) = changes.email.as_deref() {
            if email != user.email && queries::user_email_taken(&db, email, Some(&id))? {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
        }
        user
    };

    if let Some(name) = changes.name {
        user.name = name;
    }
    if let Some(email) = changes.email {
        user.email = email;
    }
    if let Some(phone) = changes.phone {
        user.phone = phone;
    }
    if let Some(password) = changes.password {
        user.password_hash = credentials::hash(password).await?;
    }
    user.updated_at = Utc::now();

    let saved = {
        let db = state.db()?;
        queries::save_user(&db, &user)?
    };
    if !saved {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(id = %id, "user profile updated");

    Ok(Json(
        Envelope::data(user).with_message("Profile updated successfully"),
    ))
}

// DELETE /api/users/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    auth.require_self(Role::User, &id)?;

    let deleted = {
        let db = state.db()?;
        queries::delete_user(&db, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(id = %id, "user account deleted");

    Ok(Json(Envelope::message("User account deleted successfully")))
}
