use super::ViewError;
use crate::client::api::{ApiClient, ClientError};
use crate::client::router::Route;
use crate::client::session::Session;
use crate::models::{Company, NewReservation, Reservation, Role};

/// A company's detail page with its booking form.
#[derive(Debug, Clone)]
pub struct CompanyDetails {
    pub company: Company,
    pub form: BookingForm,
    pub form_open: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub date: String,
    pub time: String,
    pub service: String,
    pub notes: String,
}

impl BookingForm {
    /// Builds the request body, snapshotting the booker's name and phone.
    pub fn to_reservation(&self, company: &Company, session: &Session) -> Result<NewReservation, ViewError> {
        let missing: Vec<&str> = [
            ("date", &self.date),
            ("time", &self.time),
            ("service", &self.service),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ViewError::Form(format!(
                "Please fill in the {} field(s)!",
                missing.join(", ")
            )));
        }

        Ok(NewReservation {
            user_name: Some(session.profile.name.clone()),
            user_phone: Some(session.profile.phone.clone()),
            service: Some(self.service.trim().to_string()),
            date: Some(self.date.trim().to_string()),
            time: Some(self.time.trim().to_string()),
            notes: Some(self.notes.clone()),
            status: None,
            company_id: Some(company.id.clone()),
            user_id: Some(session.profile.id.clone()),
        })
    }
}

impl CompanyDetails {
    pub fn new(company: Company) -> Self {
        Self {
            company,
            form: BookingForm::default(),
            form_open: false,
        }
    }

    pub async fn load(api: &ApiClient, id: &str) -> Result<Self, ClientError> {
        Ok(Self::new(api.get_company(id).await?))
    }

    /// Anonymous visitors are sent to login; companies may not book.
    pub fn check_can_book(session: Option<&Session>) -> Result<&Session, ViewError> {
        match session {
            None => Err(ViewError::Redirect(Route::Login)),
            Some(s) if s.role() == Role::Company => Err(ViewError::Form(
                "Companies cannot make reservations!".to_string(),
            )),
            Some(s) => Ok(s),
        }
    }

    /// Submits the booking form. On success the form is reset and closed.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        session: Option<&Session>,
    ) -> Result<Reservation, ViewError> {
        let session = Self::check_can_book(session)?;
        let body = self.form.to_reservation(&self.company, session)?;
        let reservation = api.create_reservation(&body).await?;

        tracing::info!(id = %reservation.id, company = %self.company.name, "reservation submitted");
        self.form = BookingForm::default();
        self.form_open = false;
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::client::session::Profile;

    fn company() -> Company {
        let now = Utc::now();
        Company {
            id: "c1".to_string(),
            name: "Bella".to_string(),
            email: "bella@test.com".to_string(),
            password_hash: String::new(),
            phone: "+36 20 123 4567".to_string(),
            category: "Beauty & Hair".to_string(),
            description: String::new(),
            address: String::new(),
            image: String::new(),
            services: vec!["Haircut".to_string()],
            opening_hours: String::new(),
            rating: 5.0,
            role: Role::Company,
            created_at: now,
            updated_at: now,
        }
    }

    fn session(role: Role) -> Session {
        Session {
            token: "t".to_string(),
            profile: Profile {
                id: "u1".to_string(),
                name: "Kiss Anna".to_string(),
                email: "anna@test.com".to_string(),
                phone: "+36 20 111 2222".to_string(),
                role,
                category: None,
                description: None,
                address: None,
                services: None,
                opening_hours: None,
            },
        }
    }

    #[test]
    fn anonymous_booking_redirects_to_login() {
        assert!(matches!(
            CompanyDetails::check_can_book(None),
            Err(ViewError::Redirect(Route::Login))
        ));
    }

    #[test]
    fn companies_cannot_book() {
        let company_session = session(Role::Company);
        match CompanyDetails::check_can_book(Some(&company_session)) {
            Err(ViewError::Form(msg)) => assert_eq!(msg, "Companies cannot make reservations!"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn form_snapshots_the_booker() {
        let form = BookingForm {
            date: "2025-11-20".to_string(),
            time: "10:00".to_string(),
            service: "Haircut".to_string(),
            notes: "Short, please".to_string(),
        };
        let body = form.to_reservation(&company(), &session(Role::User)).unwrap();
        assert_eq!(body.user_name.as_deref(), Some("Kiss Anna"));
        assert_eq!(body.user_phone.as_deref(), Some("+36 20 111 2222"));
        assert_eq!(body.company_id.as_deref(), Some("c1"));
        assert_eq!(body.user_id.as_deref(), Some("u1"));
        assert_eq!(body.status, None);
    }

    #[test]
    fn empty_form_is_rejected_inline() {
        let form = BookingForm {
            service: "Haircut".to_string(),
            ..Default::default()
        };
        match form.to_reservation(&company(), &session(Role::User)) {
            Err(ViewError::Form(msg)) => assert!(msg.contains("date, time")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
