pub mod auth;
pub mod companies;
pub mod health;
pub mod reservations;
pub mod users;

use axum::extract::FromRequest;

use crate::errors::AppError;

/// `Json` whose rejection is reported through the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
