use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reserveit::config::AppConfig;
use reserveit::db;
use reserveit::routes;
use reserveit::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set, signing tokens with the default secret");
    }

    let conn = db::init_db(&config.database_url)?;
    tracing::info!("using database at {}", config.database_url);

    let state = Arc::new(AppState::new(conn, config.clone()));
    let app = routes::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
