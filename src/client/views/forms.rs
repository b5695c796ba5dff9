use super::ViewError;
use crate::client::router::Route;
use crate::client::session::{SessionManager, SessionStore};
use crate::models::fields::MIN_PASSWORD_LEN;
use crate::models::{NewCompany, NewUser, Role};

/// Categories offered by the company registration form.
pub const COMPANY_CATEGORIES: &[&str] = &[
    "Beauty & Hair",
    "Fitness & Sports",
    "Wellness & Spa",
    "Auto Services",
    "Veterinary",
    "Restaurant",
    "Other",
];

fn check_passwords(password: &str, confirm: &str) -> Result<(), ViewError> {
    if password != confirm {
        return Err(ViewError::Form("Passwords do not match!".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ViewError::Form(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long!"
        )));
    }
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginForm {
    pub role: Role,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            email: String::new(),
            password: String::new(),
        }
    }

    /// Logs in and returns the dashboard to open.
    pub async fn submit<S: SessionStore>(
        &self,
        session: &mut SessionManager<S>,
    ) -> Result<Route, ViewError> {
        let signed_in = session.login(self.role, &self.email, &self.password).await?;
        Ok(Route::dashboard_for(signed_in.role()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterUserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterUserForm {
    pub fn to_request(&self) -> Result<NewUser, ViewError> {
        check_passwords(&self.password, &self.confirm_password)?;
        Ok(NewUser {
            name: non_empty(&self.name),
            email: non_empty(&self.email),
            password: Some(self.password.clone()),
            phone: non_empty(&self.phone),
        })
    }

    pub async fn submit<S: SessionStore>(
        &self,
        session: &mut SessionManager<S>,
    ) -> Result<Route, ViewError> {
        let body = self.to_request()?;
        session.register_user(&body).await?;
        Ok(Route::UserDashboard)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterCompanyForm {
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: String,
    pub category: String,
    /// Comma-separated.
    pub services: String,
    pub opening_hours: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterCompanyForm {
    pub fn to_request(&self) -> Result<NewCompany, ViewError> {
        check_passwords(&self.password, &self.confirm_password)?;
        let services: Vec<String> = self
            .services
            .split(',')
            .filter_map(non_empty)
            .collect();

        Ok(NewCompany {
            name: non_empty(&self.company_name),
            email: non_empty(&self.email),
            password: Some(self.password.clone()),
            phone: non_empty(&self.phone),
            category: non_empty(&self.category),
            description: non_empty(&self.description),
            address: non_empty(&self.address),
            image: None,
            services: (!services.is_empty()).then_some(services),
            opening_hours: non_empty(&self.opening_hours),
        })
    }

    pub async fn submit<S: SessionStore>(
        &self,
        session: &mut SessionManager<S>,
    ) -> Result<Route, ViewError> {
        let body = self.to_request()?;
        session.register_company(&body).await?;
        Ok(Route::CompanyDashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_passwords_are_rejected() {
        let form = RegisterUserForm {
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
            ..Default::default()
        };
        match form.to_request() {
            Err(ViewError::Form(msg)) => assert_eq!(msg, "Passwords do not match!"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn short_passwords_are_rejected() {
        let form = RegisterUserForm {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..Default::default()
        };
        match form.to_request() {
            Err(ViewError::Form(msg)) => {
                assert_eq!(msg, "Password must be at least 6 characters long!")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn company_form_splits_services() {
        let form = RegisterCompanyForm {
            company_name: "Bella".to_string(),
            email: "bella@test.com".to_string(),
            phone: "+36".to_string(),
            category: COMPANY_CATEGORIES[0].to_string(),
            services: "Haircut, Coloring, ,Manicure".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            ..Default::default()
        };
        let body = form.to_request().unwrap();
        assert_eq!(
            body.services,
            Some(vec![
                "Haircut".to_string(),
                "Coloring".to_string(),
                "Manicure".to_string()
            ])
        );
        assert_eq!(body.address, None);
        assert_eq!(body.category.as_deref(), Some("Beauty & Hair"));
    }
}
