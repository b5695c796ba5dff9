use std::env;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub cors_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "reserveit.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            token_ttl_days: parse_ttl_days(env::var("TOKEN_TTL_DAYS").ok().as_deref()),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Falls back to the default for anything unparsable or outside `1..=MAX_TOKEN_TTL_DAYS`.
fn parse_ttl_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|days| (1..=MAX_TOKEN_TTL_DAYS).contains(days))
        .unwrap_or(DEFAULT_TOKEN_TTL_DAYS)
}
