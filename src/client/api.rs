use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::session::Profile;
use crate::models::{
    AuthPayload, Company, CompanyUpdate, Envelope, LoginRequest, NewCompany, NewReservation,
    NewUser, Reservation, ReservationUpdate, User, UserUpdate,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a failure envelope; `message` is shown to the user as-is.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server rejected who we are rather than what we sent.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

/// Thin JSON client for the `/api` routes. Attaches the bearer token when one is set.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Envelope<T>, ClientError> {
        let mut req = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&bytes)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "API request failed".to_string());
            tracing::debug!(%method, path, %status, message = %message, "API call failed");
            return Err(ClientError::Api { status, message });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        self.send::<T>(method, path, body)
            .await?
            .data
            .ok_or_else(|| ClientError::Decode(format!("response to {path} carried no data")))
    }

    async fn message(&self, method: Method, path: &str) -> Result<String, ClientError> {
        let envelope = self.send::<serde_json::Value>(method, path, None).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    fn json<B: Serialize>(body: &B) -> Result<Option<serde_json::Value>, ClientError> {
        serde_json::to_value(body)
            .map(Some)
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    // ── Session ──

    pub async fn me(&self) -> Result<Profile, ClientError> {
        self.data(Method::GET, "/auth/me", None).await
    }

    // ── Users ──

    pub async fn register_user(&self, user: &NewUser) -> Result<AuthPayload<Profile>, ClientError> {
        self.data(Method::POST, "/users/register", Self::json(user)?)
            .await
    }

    pub async fn login_user(
        &self,
        credentials: &LoginRequest,
    ) -> Result<AuthPayload<Profile>, ClientError> {
        self.data(Method::POST, "/users/login", Self::json(credentials)?)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.data(Method::GET, "/users", None).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ClientError> {
        self.data(Method::GET, &format!("/users/{id}"), None).await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User, ClientError> {
        self.data(Method::PUT, &format!("/users/{id}"), Self::json(update)?)
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<String, ClientError> {
        self.message(Method::DELETE, &format!("/users/{id}")).await
    }

    // ── Companies ──

    pub async fn register_company(
        &self,
        company: &NewCompany,
    ) -> Result<AuthPayload<Profile>, ClientError> {
        self.data(Method::POST, "/companies/register", Self::json(company)?)
            .await
    }

    pub async fn login_company(
        &self,
        credentials: &LoginRequest,
    ) -> Result<AuthPayload<Profile>, ClientError> {
        self.data(Method::POST, "/companies/login", Self::json(credentials)?)
            .await
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, ClientError> {
        self.data(Method::GET, "/companies", None).await
    }

    pub async fn get_company(&self, id: &str) -> Result<Company, ClientError> {
        self.data(Method::GET, &format!("/companies/{id}"), None)
            .await
    }

    pub async fn update_company(
        &self,
        id: &str,
        update: &CompanyUpdate,
    ) -> Result<Company, ClientError> {
        self.data(Method::PUT, &format!("/companies/{id}"), Self::json(update)?)
            .await
    }

    pub async fn delete_company(&self, id: &str) -> Result<String, ClientError> {
        self.message(Method::DELETE, &format!("/companies/{id}"))
            .await
    }

    // ── Reservations ──

    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, ClientError> {
        self.data(Method::GET, "/reservations", None).await
    }

    pub async fn get_reservation(&self, id: &str) -> Result<Reservation, ClientError> {
        self.data(Method::GET, &format!("/reservations/{id}"), None)
            .await
    }

    pub async fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, ClientError> {
        self.data(Method::GET, &format!("/reservations/user/{user_id}"), None)
            .await
    }

    pub async fn reservations_for_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<Reservation>, ClientError> {
        self.data(
            Method::GET,
            &format!("/reservations/company/{company_id}"),
            None,
        )
        .await
    }

    pub async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, ClientError> {
        self.data(Method::POST, "/reservations", Self::json(reservation)?)
            .await
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        update: &ReservationUpdate,
    ) -> Result<Reservation, ClientError> {
        self.data(
            Method::PUT,
            &format!("/reservations/{id}"),
            Self::json(update)?,
        )
        .await
    }

    pub async fn delete_reservation(&self, id: &str) -> Result<String, ClientError> {
        self.message(Method::DELETE, &format!("/reservations/{id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let api = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(api.base_url(), "http://localhost:5000/api");
        assert_eq!(api.token(), None);
    }

    #[test]
    fn auth_failures_are_recognised() {
        let err = ClientError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "Invalid email or password".to_string(),
        };
        assert!(err.is_auth_failure());
        assert_eq!(err.to_string(), "Invalid email or password");

        let err = ClientError::Api {
            status: StatusCode::BAD_REQUEST,
            message: "Email already in use".to_string(),
        };
        assert!(!err.is_auth_failure());
    }
}
