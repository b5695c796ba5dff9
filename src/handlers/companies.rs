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
use crate::models::company::DEFAULT_RATING;
use crate::models::fields::normalize_email;
use crate::models::{AuthPayload, Company, CompanyUpdate, Envelope, LoginRequest, NewCompany, Role};
use crate::services::credentials;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Company not found".to_string())
}

// POST /api/companies/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewCompany>,
) -> AppResult<(StatusCode, Json<Envelope<AuthPayload<Company>>>)> {
    let valid = body.validate()?;

    {
        let db = state.db()?;
        if queries::company_email_taken(&db, &valid.email, None)? {
            return Err(AppError::Conflict(
                "Company already exists with this email".to_string(),
            ));
        }
    }

    let password_hash = credentials::hash(valid.password).await?;
    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4().to_string(),
        name: valid.name,
        email: valid.email,
        password_hash,
        phone: valid.phone,
        category: valid.category,
        description: valid.description,
        address: valid.address,
        image: valid.image,
        services: valid.services,
        opening_hours: valid.opening_hours,
        rating: DEFAULT_RATING,
        role: Role::Company,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db()?;
        queries::insert_company(&db, &company)?;
    }
    tracing::info!(id = %company.id, category = %company.category, "company registered");

    let token = issue_token(&state, &company.id, Role::Company)?;
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::data(AuthPayload {
                account: company,
                token,
            })
            .with_message("Company registered successfully"),
        ),
    ))
}

// POST /api/companies/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<Envelope<AuthPayload<Company>>>> {
    let company = {
        let db = state.db()?;
        queries::find_company_by_email(&db, &normalize_email(&body.email))?
    };
    let company = company.ok_or(AppError::InvalidCredentials)?;

    if !credentials::verify(body.password, company.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }
    tracing::info!(id = %company.id, "company logged in");

    let token = issue_token(&state, &company.id, Role::Company)?;
    Ok(Json(
        Envelope::data(AuthPayload {
            account: company,
            token,
        })
        .with_message("Login successful"),
    ))
}

// GET /api/companies
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Envelope<Vec<Company>>>> {
    let companies = {
        let db = state.db()?;
        queries::list_companies(&db)?
    };
    Ok(Json(Envelope::list(companies)))
}

// GET /api/companies/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Company>>> {
    let company = {
        let db = state.db()?;
        queries::get_company(&db, &id)?
    };
    Ok(Json(Envelope::data(company.ok_or_else(not_found)?)))
}

// PUT /api/companies/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CompanyUpdate>,
) -> AppResult<Json<Envelope<Company>>> {
    auth.require_self(Role::Company, &id)?;
    let changes = body.validate()?;

    let mut company = {
        let db = state.db()?;
        let company = queries::get_company(&db, &id)?.ok_or_else(not_found)?;

        if let Some(email) = changes.email.as_deref() {
            if email != company.email && queries::company_email_taken(&db, email, Some(&id))? {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
        }
        company
    };

    if let Some(v) = changes.name {
        company.name = v;
    }
    if let Some(v) = changes.email {
        company.email = v;
    }
    if let Some(v) = changes.phone {
        company.phone = v;
    }
    if let Some(v) = changes.category {
        company.category = v;
    }
    if let Some(v) = changes.description {
        company.description = v;
    }
    if let Some(v) = changes.address {
        company.address = v;
    }
    if let Some(v) = changes.image {
        company.image = v;
    }
    if let Some(v) = changes.services {
        company.services = v;
    }
    if let Some(v) = changes.opening_hours {
        company.opening_hours = v;
    }
    if let Some(password) = changes.password {
        company.password_hash = credentials::hash(password).await?;
    }
    company.updated_at = Utc::now();

    let saved = {
        let db = state.db()?;
        queries::save_company(&db, &company)?
    };
    if !saved {
        return Err(not_found());
    }
    tracing::info!(id = %id, "company profile updated");

    Ok(Json(
        Envelope::data(company).with_message("Profile updated successfully"),
    ))
}

// DELETE /api/companies/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    auth.require_self(Role::Company, &id)?;

    let deleted = {
        let db = state.db()?;
        queries::delete_company(&db, &id)?
    };
    if !deleted {
        return Err(not_found());
    }
    // Reservations referencing this company are left in place.
    tracing::info!(id = %id, "company account deleted");

    Ok(Json(Envelope::message("Company account deleted successfully")))
}
