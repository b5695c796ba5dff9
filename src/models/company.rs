use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{normalize_email, FieldErrors};
use super::Role;
use crate::errors::AppError;

pub const DEFAULT_IMAGE: &str = "https://images.unsplash.com/photo-1560179707-f14e90ef3623";
pub const DEFAULT_OPENING_HOURS: &str = "Mon-Fri: 9:00-17:00";
pub const DEFAULT_RATING: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: String,
    pub category: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub services: Vec<String>,
    pub opening_hours: String,
    pub rating: f64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub services: Option<Vec<String>>,
    pub opening_hours: Option<String>,
}

/// A registration with defaults applied; the password is still plaintext.
#[derive(Debug, Clone)]
pub struct ValidCompany {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub category: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub services: Vec<String>,
    pub opening_hours: String,
}

impl NewCompany {
    pub fn validate(&self) -> Result<ValidCompany, AppError> {
        let mut errors = FieldErrors::new();
        let name = errors.required(self.name.as_deref(), "Company name is required");
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
        let category = errors.required(self.category.as_deref(), "Category is required");
        errors.finish()?;

        Ok(ValidCompany {
            name,
            email,
            password,
            phone,
            category,
            description: self.description.clone().unwrap_or_default(),
            address: self.address.clone().unwrap_or_default(),
            image: self
                .image
                .clone()
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            services: clean_services(self.services.clone().unwrap_or_default()),
            opening_hours: self
                .opening_hours
                .clone()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENING_HOURS.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub services: Option<Vec<String>>,
    pub opening_hours: Option<String>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<CompanyUpdate, AppError> {
        let mut errors = FieldErrors::new();
        let name = errors.not_blank(self.name.as_deref(), "Company name cannot be empty");
        let email = errors
            .not_blank(self.email.as_deref(), "Email cannot be empty")
            .map(|e| normalize_email(&e));
        if let Some(email) = &email {
            errors.email(email);
        }
        let phone = errors.not_blank(self.phone.as_deref(), "Phone cannot be empty");
        let category = errors.not_blank(self.category.as_deref(), "Category cannot be empty");
        let password = self.password.clone().filter(|p| !p.is_empty());
        if let Some(password) = &password {
            errors.password(password);
        }
        errors.finish()?;

        Ok(CompanyUpdate {
            name,
            email,
            password,
            phone,
            category,
            description: self.description.clone(),
            address: self.address.clone(),
            image: self.image.clone(),
            services: self.services.clone().map(clean_services),
            opening_hours: self.opening_hours.clone(),
        })
    }
}

fn clean_services(services: Vec<String>) -> Vec<String> {
    services
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
