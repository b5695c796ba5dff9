use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::FieldErrors;
use crate::errors::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// A booking request. `user_name` and `user_phone` are a snapshot taken when the
/// reservation is made and are not re-synced from the user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub user_name: String,
    pub user_phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub notes: String,
    pub status: ReservationStatus,
    pub company_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "completed" => Some(ReservationStatus::Completed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }

    /// Pending and confirmed reservations still lie ahead.
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidReservation {
    pub user_name: String,
    pub user_phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub notes: String,
    pub status: ReservationStatus,
    pub company_id: String,
    pub user_id: String,
}

impl NewReservation {
    pub fn validate(&self) -> Result<ValidReservation, AppError> {
        let mut errors = FieldErrors::new();
        let user_name = errors.required(self.user_name.as_deref(), "User name is required");
        let user_phone = errors.required(self.user_phone.as_deref(), "Phone number is required");
        let service = errors.required(self.service.as_deref(), "Service is required");
        let date = errors.required(self.date.as_deref(), "Date is required");
        check_date(&date, &mut errors);
        let time = errors.required(self.time.as_deref(), "Time is required");
        check_time(&time, &mut errors);
        let status = check_status(self.status.as_deref(), &mut errors).unwrap_or_default();
        let company_id = errors.required(self.company_id.as_deref(), "Company id is required");
        let user_id = errors.required(self.user_id.as_deref(), "User id is required");
        errors.finish()?;

        Ok(ValidReservation {
            user_name,
            user_phone,
            service,
            date,
            time,
            notes: self.notes.clone().unwrap_or_default(),
            status,
            company_id,
            user_id,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationChanges {
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
    pub status: Option<ReservationStatus>,
}

impl ReservationUpdate {
    pub fn status(status: ReservationStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<ReservationChanges, AppError> {
        let mut errors = FieldErrors::new();
        let user_name = errors.not_blank(self.user_name.as_deref(), "User name cannot be empty");
        let user_phone =
            errors.not_blank(self.user_phone.as_deref(), "Phone number cannot be empty");
        let service = errors.not_blank(self.service.as_deref(), "Service cannot be empty");
        let date = errors.not_blank(self.date.as_deref(), "Date cannot be empty");
        if let Some(date) = &date {
            check_date(date, &mut errors);
        }
        let time = errors.not_blank(self.time.as_deref(), "Time cannot be empty");
        if let Some(time) = &time {
            check_time(time, &mut errors);
        }
        let status = check_status(self.status.as_deref(), &mut errors);
        errors.finish()?;

        Ok(ReservationChanges {
            user_name,
            user_phone,
            service,
            date,
            time,
            notes: self.notes.clone(),
            status,
        })
    }
}

impl ReservationChanges {
    /// True when the update does nothing but cancel.
    pub fn is_cancellation_only(&self) -> bool {
        *self
            == ReservationChanges {
                status: Some(ReservationStatus::Cancelled),
                ..Default::default()
            }
    }

    pub fn apply(self, reservation: &mut Reservation) {
        if let Some(v) = self.user_name {
            reservation.user_name = v;
        }
        if let Some(v) = self.user_phone {
            reservation.user_phone = v;
        }
        if let Some(v) = self.service {
            reservation.service = v;
        }
        if let Some(v) = self.date {
            reservation.date = v;
        }
        if let Some(v) = self.time {
            reservation.time = v;
        }
        if let Some(v) = self.notes {
            reservation.notes = v;
        }
        if let Some(v) = self.status {
            reservation.status = v;
        }
    }
}

fn check_date(date: &str, errors: &mut FieldErrors) {
    if !date.is_empty() && NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
        errors.push("Date must be formatted as YYYY-MM-DD");
    }
}

fn check_time(time: &str, errors: &mut FieldErrors) {
    if !time.is_empty() && NaiveTime::parse_from_str(time, TIME_FORMAT).is_err() {
        errors.push("Time must be formatted as HH:MM");
    }
}

fn check_status(status: Option<&str>, errors: &mut FieldErrors) -> Option<ReservationStatus> {
    let raw = status?;
    let parsed = ReservationStatus::parse(raw.trim());
    if parsed.is_none() {
        errors.push(format!(
            "`{raw}` is not a valid status (expected pending, confirmed, completed or cancelled)"
        ));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haircut() -> NewReservation {
        NewReservation {
            user_name: Some("Kiss Anna".into()),
            user_phone: Some("+36 20 111 2222".into()),
            service: Some("Haircut".into()),
            date: Some("2025-11-20".into()),
            time: Some("10:00".into()),
            company_id: Some("c1".into()),
            user_id: Some("u1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn status_defaults_to_pending() {
        let valid = haircut().validate().unwrap();
        assert_eq!(valid.status, ReservationStatus::Pending);
        assert_eq!(valid.notes, "");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let update = ReservationUpdate {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let reservation = NewReservation {
            date: Some("20/11/2025".into()),
            ..haircut()
        };
        match reservation.validate() {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields, vec!["Date must be formatted as YYYY-MM-DD".to_string()])
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn references_are_required() {
        let reservation = NewReservation {
            company_id: None,
            user_id: None,
            ..haircut()
        };
        match reservation.validate() {
            Err(AppError::Validation(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_only_detection() {
        let cancel = ReservationUpdate::status(ReservationStatus::Cancelled)
            .validate()
            .unwrap();
        assert!(cancel.is_cancellation_only());

        let reschedule = ReservationUpdate {
            status: Some("cancelled".into()),
            time: Some("11:00".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(!reschedule.is_cancellation_only());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ReservationStatus::Confirmed).unwrap(),
            "confirmed"
        );
    }
}
