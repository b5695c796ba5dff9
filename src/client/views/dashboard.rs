use super::ViewError;
use crate::client::api::ApiClient;
use crate::client::router::{guard, Navigation, Route};
use crate::client::session::Session;
use crate::models::{Reservation, ReservationStatus, ReservationUpdate};

/// The filter buttons shared by both dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Pending or confirmed.
    Upcoming,
    /// Completed or cancelled.
    Past,
    Only(ReservationStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> StatusFilter {
        match s {
            "upcoming" => StatusFilter::Upcoming,
            "past" => StatusFilter::Past,
            other => ReservationStatus::parse(other)
                .map(StatusFilter::Only)
                .unwrap_or(StatusFilter::All),
        }
    }

    pub fn matches(&self, status: ReservationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Upcoming => status.is_active(),
            StatusFilter::Past => !status.is_active(),
            StatusFilter::Only(s) => *s == status,
        }
    }
}

fn count(reservations: &[Reservation], f: impl Fn(ReservationStatus) -> bool) -> usize {
    reservations.iter().filter(|r| f(r.status)).count()
}

/// Dashboards are only reachable through the navigation guard.
fn owner_id(session: Option<&Session>, route: Route) -> Result<String, ViewError> {
    match guard(route, session) {
        Navigation::Allow(_) => Ok(session.map(|s| s.profile.id.clone()).unwrap_or_default()),
        Navigation::Redirect(to) => Err(ViewError::Redirect(to)),
    }
}

fn replace(reservations: &mut [Reservation], updated: Reservation) {
    if let Some(slot) = reservations.iter_mut().find(|r| r.id == updated.id) {
        *slot = updated;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub active: usize,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone)]
pub struct UserDashboard {
    pub user_id: String,
    pub reservations: Vec<Reservation>,
    pub filter: StatusFilter,
}

impl UserDashboard {
    pub async fn load(api: &ApiClient, session: Option<&Session>) -> Result<Self, ViewError> {
        let user_id = owner_id(session, Route::UserDashboard)?;
        let reservations = api.reservations_for_user(&user_id).await?;
        Ok(Self {
            user_id,
            reservations,
            filter: StatusFilter::All,
        })
    }

    pub fn stats(&self) -> UserStats {
        UserStats {
            active: count(&self.reservations, |s| s.is_active()),
            completed: count(&self.reservations, |s| s == ReservationStatus::Completed),
            pending: count(&self.reservations, |s| s == ReservationStatus::Pending),
        }
    }

    pub fn visible(&self) -> Vec<&Reservation> {
        self.reservations
            .iter()
            .filter(|r| self.filter.matches(r.status))
            .collect()
    }

    /// Users can only cancel their own bookings.
    pub async fn cancel(&mut self, api: &ApiClient, id: &str) -> Result<(), ViewError> {
        let updated = api
            .update_reservation(id, &ReservationUpdate::status(ReservationStatus::Cancelled))
            .await?;
        replace(&mut self.reservations, updated);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyStats {
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
}

#[derive(Debug, Clone)]
pub struct CompanyDashboard {
    pub company_id: String,
    pub reservations: Vec<Reservation>,
    pub filter: StatusFilter,
}

impl CompanyDashboard {
    pub async fn load(api: &ApiClient, session: Option<&Session>) -> Result<Self, ViewError> {
        let company_id = owner_id(session, Route::CompanyDashboard)?;
        let reservations = api.reservations_for_company(&company_id).await?;
        Ok(Self {
            company_id,
            reservations,
            filter: StatusFilter::All,
        })
    }

    pub fn stats(&self) -> CompanyStats {
        CompanyStats {
            pending: count(&self.reservations, |s| s == ReservationStatus::Pending),
            confirmed: count(&self.reservations, |s| s == ReservationStatus::Confirmed),
            completed: count(&self.reservations, |s| s == ReservationStatus::Completed),
        }
    }

    pub fn visible(&self) -> Vec<&Reservation> {
        self.reservations
            .iter()
            .filter(|r| self.filter.matches(r.status))
            .collect()
    }

    pub async fn confirm(&mut self, api: &ApiClient, id: &str) -> Result<(), ViewError> {
        self.set_status(api, id, ReservationStatus::Confirmed).await
    }

    pub async fn complete(&mut self, api: &ApiClient, id: &str) -> Result<(), ViewError> {
        self.set_status(api, id, ReservationStatus::Completed).await
    }

    pub async fn cancel(&mut self, api: &ApiClient, id: &str) -> Result<(), ViewError> {
        self.set_status(api, id, ReservationStatus::Cancelled).await
    }

    async fn set_status(
        &mut self,
        api: &ApiClient,
        id: &str,
        status: ReservationStatus,
    ) -> Result<(), ViewError> {
        let updated = api
            .update_reservation(id, &ReservationUpdate::status(status))
            .await?;
        replace(&mut self.reservations, updated);
        Ok(())
    }
}
