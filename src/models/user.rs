use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{normalize_email, FieldErrors};
use super::Role;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload. Fields are optional so a missing one is reported as a
/// validation failure rather than a body parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// Fields of a registration that passed validation; the password is still plaintext.
#[derive(Debug, Clone)]
pub struct ValidUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<ValidUser, AppError> {
        let mut errors = FieldErrors::new();
        let name = errors.required(self.name.as_deref(), "Name is required");
        let email = normalize_email(&errors.required(self.email.as_deref(), "Email is required"));
        errors.email(&email);
        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => {
                errors.push("Password is required");
                String::new()
            }
        };
        errors.password(&password);
        let phone = errors.required(self.phone.as_deref(), "Phone is required");
        errors.finish()?;

        Ok(ValidUser {
            name,
            email,
            password,
            phone,
        })
    }
}

/// Profile update: any subset of name/email/phone/password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl UserUpdate {
    /// Validates the provided fields and returns them trimmed, email normalized.
    pub fn validate(&self) -> Result<UserUpdate, AppError> {
        let mut errors = FieldErrors::new();
        let name = errors.not_blank(self.name.as_deref(), "Name cannot be empty");
        let email = errors
            .not_blank(self.email.as_deref(), "Email cannot be empty")
            .map(|e| normalize_email(&e));
        if let Some(email) = &email {
            errors.email(email);
        }
        let phone = errors.not_blank(self.phone.as_deref(), "Phone cannot be empty");
        let password = self.password.clone().filter(|p| !p.is_empty());
        if let Some(password) = &password {
            errors.password(password);
        }
        errors.finish()?;

        Ok(UserUpdate {
            name,
            email,
            phone,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            name: "Anna".into(),
            email: "anna@test.com".into(),
            password_hash: "$2b$10$abc".into(),
            phone: "+36 20 111 2222".into(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn registration_lists_missing_fields() {
        let err = NewUser {
            email: Some("anna@test.com".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert!(fields.contains(&"Name is required".to_string()));
                assert!(fields.contains(&"Password is required".to_string()));
                assert!(fields.contains(&"Phone is required".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn registration_normalizes_email() {
        let valid = NewUser {
            name: Some(" Anna ".into()),
            email: Some("Anna@Test.com".into()),
            password: Some("secret1".into()),
            phone: Some("+36 20 111 2222".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.name, "Anna");
        assert_eq!(valid.email, "anna@test.com");
    }

    #[test]
    fn update_rejects_short_password() {
        let update = UserUpdate {
            password: Some("123".into()),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(AppError::Validation(_))));
    }
}
