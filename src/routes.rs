use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, companies, health, reservations, users};
use crate::state::AppState;

/// Every route under `/api`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/companies", get(companies::list))
        .route("/companies/register", post(companies::register))
        .route("/companies/login", post(companies::login))
        .route(
            "/companies/:id",
            get(companies::get)
                .put(companies::update)
                .delete(companies::delete),
        )
        .route(
            "/reservations",
            get(reservations::list).post(reservations::create),
        )
        .route(
            "/reservations/user/:user_id",
            get(reservations::list_for_user),
        )
        .route(
            "/reservations/company/:company_id",
            get(reservations::list_for_company),
        )
        .route(
            "/reservations/:id",
            get(reservations::get)
                .put(reservations::update)
                .delete(reservations::delete),
        )
}

fn cors(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "invalid CORS_ORIGIN, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors(state.config.cors_origin.as_deref());
    Router::new()
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
