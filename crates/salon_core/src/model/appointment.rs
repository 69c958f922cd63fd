//! Appointment domain model.
//!
//! # Responsibility
//! - Define the confirmed booking record and its status lifecycle.
//!
//! # Invariants
//! - `id` is stable and never reused for another appointment.
//! - New appointments start as `Scheduled`.
//! - `Completed` and `Cancelled` are terminal.
//! - `end_time` is later than `start_time`.

use super::catalog::{ProfessionalId, ServiceId};
use super::slot::TimeSlot;
use super::{normalize_optional_text, ModelValidationError, TIME_FORMAT};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable appointment identifier.
pub type AppointmentId = Uuid;

/// Appointment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked and holding its slot.
    Scheduled,
    /// Service delivered. Terminal.
    Completed,
    /// Booking withdrawn; slot released. Terminal.
    Cancelled,
}

impl AppointmentStatus {
    /// Stable lowercase id used in storage and FFI payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stable status id; surrounding whitespace and case are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scheduled)
    }

    /// Returns whether moving from `self` to `target` is a legal transition.
    ///
    /// Only `scheduled -> completed` and `scheduled -> cancelled` are legal.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Scheduled, Self::Completed) | (Self::Scheduled, Self::Cancelled)
        )
    }
}

/// Client-entered booking details attached to an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl ClientDetails {
    /// Builds details from raw form input.
    ///
    /// Required fields are trimmed; blank optional fields become `None`.
    pub fn from_form(name: &str, phone: &str, email: Option<&str>, notes: Option<&str>) -> Self {
        Self {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            email: normalize_optional_text(email),
            notes: normalize_optional_text(notes),
        }
    }
}

/// A confirmed booking of one slot for one client and service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub service_id: ServiceId,
    pub professional_id: ProfessionalId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Creates a `Scheduled` appointment holding `slot`, with a generated id.
    ///
    /// The appointment copies the slot's professional, date and time range.
    pub fn schedule(
        slot: &TimeSlot,
        service_id: ServiceId,
        client: ClientDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_name: client.name,
            client_phone: client.phone,
            client_email: client.email,
            service_id,
            professional_id: slot.professional_id.clone(),
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            status: AppointmentStatus::Scheduled,
            notes: client.notes,
            created_at,
        }
    }

    /// Validates record-level invariants.
    ///
    /// # Errors
    /// - `EmptyField` when client name or phone is blank.
    /// - `InvalidTimeRange` when `end_time <= start_time`.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.client_name.trim().is_empty() {
            return Err(ModelValidationError::EmptyField("client_name"));
        }
        if self.client_phone.trim().is_empty() {
            return Err(ModelValidationError::EmptyField("client_phone"));
        }
        if self.end_time <= self.start_time {
            return Err(ModelValidationError::InvalidTimeRange {
                start: self.start_time.format(TIME_FORMAT).to_string(),
                end: self.end_time.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(())
    }

    /// Returns whether this appointment currently holds its slot.
    pub fn is_active(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::{Appointment, AppointmentStatus, ClientDetails};
    use crate::model::catalog::{ProfessionalId, ServiceId};
    use crate::model::slot::TimeSlot;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    #[test]
    fn only_scheduled_can_transition() {
        use AppointmentStatus::*;
        assert!(Scheduled.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(!Scheduled.can_transition_to(Scheduled));
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for target in [Scheduled, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn status_parse_accepts_stable_ids() {
        assert_eq!(
            AppointmentStatus::parse(" Cancelled "),
            Some(AppointmentStatus::Cancelled)
        );
        assert_eq!(AppointmentStatus::parse("done"), None);
    }

    #[test]
    fn client_details_collapse_blank_optionals() {
        let details = ClientDetails::from_form(" Maria ", "11999999999", Some("  "), None);
        assert_eq!(details.name, "Maria");
        assert_eq!(details.email, None);
        assert_eq!(details.notes, None);
    }

    #[test]
    fn only_scheduled_appointments_hold_their_slot() {
        let slot = TimeSlot::new(
            ProfessionalId::new("1"),
            NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date"),
            NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            NaiveTime::from_hms_opt(11, 0, 0).expect("valid time"),
            true,
        );
        let mut appointment = Appointment::schedule(
            &slot,
            ServiceId::new("1"),
            ClientDetails::from_form("Maria", "11999999999", None, None),
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        );
        assert!(appointment.is_active());
        assert_eq!(appointment.end_time, slot.end_time);

        appointment.status = AppointmentStatus::Completed;
        assert!(!appointment.is_active());
        appointment.status = AppointmentStatus::Cancelled;
        assert!(!appointment.is_active());
    }
}
