use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::api::{ApiClient, ClientError};
use crate::models::{AuthPayload, CompanyUpdate, LoginRequest, NewCompany, NewUser, Role, UserUpdate};

/// Cached account details shown by the views. Company-only fields are absent for users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

/// Proof of authentication kept across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.profile.role
    }
}

impl From<AuthPayload<Profile>> for Session {
    fn from(payload: AuthPayload<Profile>) -> Self {
        Session {
            token: payload.token,
            profile: payload.account,
        }
    }
}

/// Where a session is persisted between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<Session>>;
    fn save(&self, session: &Session) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> anyhow::Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file {}", self.path.display()))?;
        let session = serde_json::from_str(&raw).context("stored session is corrupt")?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("failed to create session directory")?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write session file {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("failed to remove session file")?;
        }
        Ok(())
    }
}

/// In-process store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Option<Session>>> {
        self.slot
            .lock()
            .map_err(|_| anyhow::anyhow!("session store mutex poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> anyhow::Result<Option<Session>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Which state the session machine is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    AuthenticatedAsUser,
    AuthenticatedAsCompany,
}

/// Owns the current session and keeps the API client's token and the store in step with it.
/// Created once at startup and handed to the views.
pub struct SessionManager<S: SessionStore> {
    store: S,
    api: ApiClient,
    current: Option<Session>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, api: ApiClient) -> Self {
        let mut api = api;
        api.set_token(None);
        Self {
            store,
            api,
            current: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match self.current.as_ref().map(Session::role) {
            None => SessionState::Anonymous,
            Some(Role::User) => SessionState::AuthenticatedAsUser,
            Some(Role::Company) => SessionState::AuthenticatedAsCompany,
        }
    }

    /// Rehydrates the stored session and confirms it with the server before trusting it.
    ///
    /// A corrupt, expired or revoked session is discarded. If the server cannot be
    /// reached or fails to answer, the stored session is kept for a later attempt
    /// but not used.
    pub async fn restore(&mut self) -> Result<Option<&Session>, ClientError> {
        self.current = None;
        self.api.set_token(None);

        let stored = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                self.forget();
                return Ok(None);
            }
        };

        let mut probe = self.api.clone();
        probe.set_token(Some(stored.token.clone()));
        match probe.me().await {
            Ok(profile) => {
                let session = Session {
                    token: stored.token,
                    profile,
                };
                self.adopt(session);
                Ok(self.current.as_ref())
            }
            Err(e) if e.is_auth_failure() => {
                tracing::info!(error = %e, "stored session rejected by server");
                self.forget();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn login(&mut self, role: Role, email: &str, password: &str) -> Result<&Session, ClientError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let payload = match role {
            Role::User => self.api.login_user(&credentials).await?,
            Role::Company => self.api.login_company(&credentials).await?,
        };
        Ok(self.adopt(payload.into()))
    }

    pub async fn register_user(&mut self, user: &NewUser) -> Result<&Session, ClientError> {
        let payload = self.api.register_user(user).await?;
        Ok(self.adopt(payload.into()))
    }

    pub async fn register_company(&mut self, company: &NewCompany) -> Result<&Session, ClientError> {
        let payload = self.api.register_company(company).await?;
        Ok(self.adopt(payload.into()))
    }

    pub fn logout(&mut self) {
        self.forget();
    }

    /// Saves profile changes on the server and refreshes the cached profile from the answer.
    pub async fn update_user_profile(&mut self, update: &UserUpdate) -> Result<&Session, ClientError> {
        let id = self.require(Role::User)?;
        let user = self.api.update_user(&id, update).await?;
        let profile = serde_json::to_value(&user)
            .and_then(serde_json::from_value)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.replace_profile(profile)
    }

    pub async fn update_company_profile(
        &mut self,
        update: &CompanyUpdate,
    ) -> Result<&Session, ClientError> {
        let id = self.require(Role::Company)?;
        let company = self.api.update_company(&id, update).await?;
        let profile = serde_json::to_value(&company)
            .and_then(serde_json::from_value)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.replace_profile(profile)
    }

    fn require(&self, role: Role) -> Result<String, ClientError> {
        match &self.current {
            Some(session) if session.role() == role => Ok(session.profile.id.clone()),
            _ => Err(ClientError::Api {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: "Please log in first".to_string(),
            }),
        }
    }

    fn replace_profile(&mut self, profile: Profile) -> Result<&Session, ClientError> {
        let token = self
            .current
            .as_ref()
            .map(|s| s.token.clone())
            .unwrap_or_default();
        Ok(self.adopt(Session { token, profile }))
    }

    fn adopt(&mut self, session: Session) -> &Session {
        if let Err(e) = self.store.save(&session) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        self.api.set_token(Some(session.token.clone()));
        self.current.insert(session)
    }

    fn forget(&mut self) {
        self.current = None;
        self.api.set_token(None);
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
    }
}
