use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::auth::AuthAccount;
use super::ApiJson;
use crate::db::queries::{self, ReservationFilter};
use crate::errors::{AppError, AppResult};
use crate::models::{Envelope, NewReservation, Reservation, ReservationUpdate, Role};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Reservation not found".to_string())
}

fn list_by(state: &AppState, filter: ReservationFilter<'_>) -> AppResult<Json<Envelope<Vec<Reservation>>>> {
    let reservations = {
        let db = state.db()?;
        queries::list_reservations(&db, filter)?
    };
    Ok(Json(Envelope::list(reservations)))
}

// GET /api/reservations
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Envelope<Vec<Reservation>>>> {
    list_by(&state, ReservationFilter::All)
}

// GET /api/reservations/user/:user_id
pub async fn list_for_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Envelope<Vec<Reservation>>>> {
    list_by(&state, ReservationFilter::ByUser(&user_id))
}

// GET /api/reservations/company/:company_id
pub async fn list_for_company(
    State(state): State<Arc<AppState>>,
    Path(company_id): Path<String>,
) -> AppResult<Json<Envelope<Vec<Reservation>>>> {
    list_by(&state, ReservationFilter::ByCompany(&company_id))
}

// GET /api/reservations/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<Reservation>>> {
    let reservation = {
        let db = state.db()?;
        queries::get_reservation(&db, &id)?
    };
    Ok(Json(Envelope::data(reservation.ok_or_else(not_found)?)))
}

// POST /api/reservations
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    ApiJson(body): ApiJson<NewReservation>,
) -> AppResult<(StatusCode, Json<Envelope<Reservation>>)> {
    if auth.role != Role::User {
        return Err(AppError::Forbidden(
            "Companies cannot make reservations".to_string(),
        ));
    }
    let valid = body.validate()?;
    if valid.user_id != auth.id {
        return Err(AppError::Forbidden(
            "Reservations can only be made for your own account".to_string(),
        ));
    }

    let now = Utc::now();
    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        user_name: valid.user_name,
        user_phone: valid.user_phone,
        service: valid.service,
        date: valid.date,
        time: valid.time,
        notes: valid.notes,
        status: valid.status,
        company_id: valid.company_id,
        user_id: valid.user_id,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db()?;
        queries::insert_reservation(&db, &reservation)?;
    }
    tracing::info!(
        id = %reservation.id,
        company_id = %reservation.company_id,
        date = %reservation.date,
        time = %reservation.time,
        "reservation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(reservation).with_message("Reservation created successfully")),
    ))
}

// PUT /api/reservations/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ReservationUpdate>,
) -> AppResult<Json<Envelope<Reservation>>> {
    let changes = body.validate()?;

    let db = state.db()?;
    let mut reservation = queries::get_reservation(&db, &id)?.ok_or_else(not_found)?;

    // The company may change anything; the user who booked may only cancel.
    let allowed = auth.is(Role::Company, &reservation.company_id)
        || (auth.is(Role::User, &reservation.user_id) && changes.is_cancellation_only());
    if !allowed {
        return Err(AppError::Forbidden(
            "Not allowed to modify this reservation".to_string(),
        ));
    }

    let previous = reservation.status;
    changes.apply(&mut reservation);
    reservation.updated_at = Utc::now();

    if !queries::save_reservation(&db, &reservation)? {
        return Err(not_found());
    }
    tracing::info!(id = %id, from = %previous, to = %reservation.status, "reservation updated");

    Ok(Json(
        Envelope::data(reservation).with_message("Reservation updated successfully"),
    ))
}

// DELETE /api/reservations/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(id): Path<String>,
) -> AppResult<Json<Envelope<()>>> {
    let db = state.db()?;
    let reservation = queries::get_reservation(&db, &id)?.ok_or_else(not_found)?;

    if !auth.is(Role::Company, &reservation.company_id) && !auth.is(Role::User, &reservation.user_id)
    {
        return Err(AppError::Forbidden(
            "Not allowed to delete this reservation".to_string(),
        ));
    }

    if !queries::delete_reservation(&db, &id)? {
        return Err(not_found());
    }
    tracing::info!(id = %id, "reservation deleted");

    Ok(Json(Envelope::message("Reservation deleted successfully")))
}
