use axum::Json;

use crate::models::Envelope;

pub async fn health() -> Json<Envelope<()>> {
    Json(Envelope::message("ok"))
}
