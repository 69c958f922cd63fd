//! Booking engine.
//!
//! # Responsibility
//! - Validate booking requests against the catalog and slot state.
//! - Create appointments and drive the status lifecycle.
//! - Emit a deterministic outcome (`Notice` or `BookingError`) per command.
//!
//! # Invariants
//! - A rejected command leaves slots and appointments unchanged.
//! - Availability is re-checked atomically with the booking write.
//! - Cancelling a scheduled appointment re-opens its slot.
//! - Repeating a status change to the current status is a no-op.

use crate::catalog::Catalog;
use crate::model::appointment::{Appointment, AppointmentId, AppointmentStatus, ClientDetails};
use crate::model::catalog::{Professional, ProfessionalId, Service, ServiceId};
use crate::model::slot::{SlotId, TimeSlot};
use crate::repo::appointment_repo::AppointmentListQuery;
use crate::repo::booking_repo::BookingRepository;
use crate::repo::slot_repo::SlotListQuery;
use crate::repo::RepoError;
use crate::slots::availability::AvailabilitySource;
use crate::slots::generator::SlotGenerator;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BookingResult<T> = Result<T, BookingError>;

/// Booking command failure.
#[derive(Debug)]
pub enum BookingError {
    EmptyClientName,
    EmptyClientPhone,
    MissingService,
    UnknownService(ServiceId),
    UnknownProfessional(ProfessionalId),
    /// The service exists but the professional does not perform it.
    ServiceNotOffered {
        professional_id: ProfessionalId,
        service_id: ServiceId,
    },
    SlotNotFound(SlotId),
    /// The slot belongs to a different professional than requested.
    SlotProfessionalMismatch {
        slot_id: SlotId,
        professional_id: ProfessionalId,
    },
    SlotUnavailable(SlotId),
    AppointmentNotFound(AppointmentId),
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    /// Status commands only accept `completed` or `cancelled`.
    InvalidTargetStatus(AppointmentStatus),
    InvalidMonth {
        year: i32,
        month: u32,
    },
    Repo(RepoError),
}

impl BookingError {
    /// Stable machine code for presentation mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyClientName => "empty_client_name",
            Self::EmptyClientPhone => "empty_client_phone",
            Self::MissingService => "missing_service",
            Self::UnknownService(_) => "unknown_service",
            Self::UnknownProfessional(_) => "unknown_professional",
            Self::ServiceNotOffered { .. } => "service_not_offered",
            Self::SlotNotFound(_) => "slot_not_found",
            Self::SlotProfessionalMismatch { .. } => "slot_professional_mismatch",
            Self::SlotUnavailable(_) => "slot_unavailable",
            Self::AppointmentNotFound(_) => "appointment_not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvalidTargetStatus(_) => "invalid_target_status",
            Self::InvalidMonth { .. } => "invalid_month",
            Self::Repo(_) => "storage_error",
        }
    }

    /// Whether this is a rejected booking form, as opposed to a state conflict.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyClientName
                | Self::EmptyClientPhone
                | Self::MissingService
                | Self::UnknownService(_)
                | Self::ServiceNotOffered { .. }
        )
    }
}

impl Display for BookingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyClientName => write!(f, "client name is required"),
            Self::EmptyClientPhone => write!(f, "client phone is required"),
            Self::MissingService => write!(f, "a service must be selected"),
            Self::UnknownService(id) => write!(f, "unknown service `{id}`"),
            Self::UnknownProfessional(id) => write!(f, "unknown professional `{id}`"),
            Self::ServiceNotOffered {
                professional_id,
                service_id,
            } => write!(
                f,
                "professional `{professional_id}` does not perform service `{service_id}`"
            ),
            Self::SlotNotFound(id) => write!(f, "time slot not found: {id}"),
            Self::SlotProfessionalMismatch {
                slot_id,
                professional_id,
            } => write!(
                f,
                "time slot `{slot_id}` does not belong to professional `{professional_id}`"
            ),
            Self::SlotUnavailable(id) => write!(f, "time slot is not available: {id}"),
            Self::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            Self::InvalidTransition { from, to } => write!(
                f,
                "appointment status cannot change from {} to {}",
                from.as_str(),
                to.as_str()
            ),
            Self::InvalidTargetStatus(status) => write!(
                f,
                "target status must be completed or cancelled, got {}",
                status.as_str()
            ),
            Self::InvalidMonth { year, month } => write!(f, "invalid month {year}-{month:02}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BookingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::SlotNotFound(id) => Self::SlotNotFound(id),
            RepoError::SlotConflict(id) => Self::SlotUnavailable(id),
            RepoError::AppointmentNotFound(id) => Self::AppointmentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Success signal of a booking command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    BookingConfirmed,
    AppointmentCompleted,
    AppointmentCancelled,
}

impl Notice {
    /// Stable machine code for presentation mapping.
    pub fn code(self) -> &'static str {
        match self {
            Self::BookingConfirmed => "booking_confirmed",
            Self::AppointmentCompleted => "appointment_completed",
            Self::AppointmentCancelled => "appointment_cancelled",
        }
    }
}

/// Booking form request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub slot_id: SlotId,
    pub professional_id: ProfessionalId,
    pub service_id: ServiceId,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub notes: Option<String>,
}

/// Open booking context returned by `select_slot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingContext {
    pub slot: TimeSlot,
    pub professional: Professional,
    /// Services offered in the booking form, in catalog order.
    pub services: Vec<Service>,
}

/// Result of a status command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub appointment: AppointmentId,
    /// Status after the command.
    pub status: AppointmentStatus,
    /// `false` when the appointment already had the requested status.
    pub changed: bool,
}

impl StatusChange {
    pub fn notice(&self) -> Notice {
        match self.status {
            AppointmentStatus::Cancelled => Notice::AppointmentCancelled,
            _ => Notice::AppointmentCompleted,
        }
    }
}

/// Counters for one slot generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generated: usize,
    /// Slots not previously stored.
    pub inserted: usize,
    /// Stored slots closed because a scheduled appointment holds them.
    pub reconciled: usize,
}

/// Booking engine over a repository and a catalog.
pub struct BookingService<'a, R: BookingRepository> {
    repo: R,
    catalog: &'a Catalog,
}

impl<'a, R: BookingRepository> BookingService<'a, R> {
    pub fn new(repo: R, catalog: &'a Catalog) -> Self {
        Self { repo, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn list_services(&self) -> &[Service] {
        self.catalog.services()
    }

    pub fn list_professionals(&self) -> &[Professional] {
        self.catalog.professionals()
    }

    pub fn eligible_services(&self, professional_id: &ProfessionalId) -> Vec<&Service> {
        self.catalog.eligible_services(professional_id)
    }

    pub fn list_slots(&self, query: &SlotListQuery) -> BookingResult<Vec<TimeSlot>> {
        Ok(self.repo.list_slots(query)?)
    }

    pub fn list_appointments(&self, query: &AppointmentListQuery) -> BookingResult<Vec<Appointment>> {
        Ok(self.repo.list_appointments(query)?)
    }

    pub fn get_appointment(&self, id: AppointmentId) -> BookingResult<Option<Appointment>> {
        Ok(self.repo.get_appointment(id)?)
    }

    /// Generates and stores the horizon starting at `start_date`.
    ///
    /// Already-stored slots keep their state; stored slots held by a
    /// scheduled appointment are closed.
    pub fn generate_slots(
        &self,
        generator: &SlotGenerator,
        start_date: NaiveDate,
        availability: &mut dyn AvailabilitySource,
    ) -> BookingResult<GenerationSummary> {
        let slots = generator.generate(self.catalog, start_date, availability);
        let inserted = self.repo.insert_slots(&slots)?;
        let reconciled = self.repo.reconcile_held_slots()?;
        info!(
            "event=slots_generate module=booking status=ok start_date={} generated={} inserted={} reconciled={}",
            start_date,
            slots.len(),
            inserted,
            reconciled
        );
        Ok(GenerationSummary {
            generated: slots.len(),
            inserted,
            reconciled,
        })
    }

    /// Opens a booking context for an available slot. Does not mutate.
    ///
    /// # Errors
    /// - `UnknownProfessional`, `SlotNotFound`, `SlotProfessionalMismatch`.
    /// - `SlotUnavailable` when the slot is closed.
    pub fn select_slot(
        &self,
        slot_id: &SlotId,
        professional_id: &ProfessionalId,
    ) -> BookingResult<BookingContext> {
        let professional = self
            .catalog
            .professional(professional_id)
            .ok_or_else(|| BookingError::UnknownProfessional(professional_id.clone()))?;
        let slot = self.load_slot_for(slot_id, professional_id)?;
        if !slot.is_available {
            return Err(BookingError::SlotUnavailable(slot.id));
        }

        Ok(BookingContext {
            slot,
            professional: professional.clone(),
            services: self
                .catalog
                .eligible_services(professional_id)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    /// Confirms a booking and closes its slot.
    ///
    /// # Contract
    /// - Validation order: name, phone, service, professional, slot.
    /// - On success the appointment is `scheduled` and the slot unavailable.
    /// - On any error nothing is written.
    pub fn confirm_booking(&self, request: &BookingRequest) -> BookingResult<Appointment> {
        match self.try_confirm_booking(request) {
            Ok(appointment) => {
                info!(
                    "event=booking_confirm module=booking status=ok appointment_id={} slot_id={} service_id={}",
                    appointment.id, request.slot_id, appointment.service_id
                );
                Ok(appointment)
            }
            Err(err) => {
                warn!(
                    "event=booking_confirm module=booking status=rejected slot_id={} error_code={}",
                    request.slot_id,
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Moves a scheduled appointment to `completed` or `cancelled`.
    ///
    /// # Contract
    /// - Unknown id: `AppointmentNotFound`, nothing written.
    /// - Same status as current: `changed = false`, nothing written.
    /// - Cancelling re-opens the matching slot in the same transaction.
    pub fn change_status(
        &self,
        id: AppointmentId,
        target: AppointmentStatus,
    ) -> BookingResult<StatusChange> {
        let result = self.try_change_status(id, target);
        match &result {
            Ok(change) => info!(
                "event=status_change module=booking status=ok appointment_id={} target={} changed={}",
                id,
                target.as_str(),
                change.changed
            ),
            Err(err) => warn!(
                "event=status_change module=booking status=rejected appointment_id={} target={} error_code={}",
                id,
                target.as_str(),
                err.code()
            ),
        }
        result
    }

    fn try_confirm_booking(&self, request: &BookingRequest) -> BookingResult<Appointment> {
        let client = ClientDetails::from_form(
            &request.client_name,
            &request.client_phone,
            request.client_email.as_deref(),
            request.notes.as_deref(),
        );
        if client.name.is_empty() {
            return Err(BookingError::EmptyClientName);
        }
        if client.phone.is_empty() {
            return Err(BookingError::EmptyClientPhone);
        }
        if request.service_id.as_str().trim().is_empty() {
            return Err(BookingError::MissingService);
        }
        let service = self
            .catalog
            .service(&request.service_id)
            .ok_or_else(|| BookingError::UnknownService(request.service_id.clone()))?;
        let professional = self
            .catalog
            .professional(&request.professional_id)
            .ok_or_else(|| BookingError::UnknownProfessional(request.professional_id.clone()))?;
        if !professional.offers(&service.id) {
            return Err(BookingError::ServiceNotOffered {
                professional_id: professional.id.clone(),
                service_id: service.id.clone(),
            });
        }

        let slot = self.load_slot_for(&request.slot_id, &professional.id)?;
        if !slot.is_available {
            return Err(BookingError::SlotUnavailable(slot.id));
        }

        let appointment = Appointment::schedule(&slot, service.id.clone(), client, Utc::now());
        self.repo.commit_booking(&appointment, &slot.id)?;
        Ok(appointment)
    }

    fn try_change_status(
        &self,
        id: AppointmentId,
        target: AppointmentStatus,
    ) -> BookingResult<StatusChange> {
        if target == AppointmentStatus::Scheduled {
            return Err(BookingError::InvalidTargetStatus(target));
        }

        let current = self
            .repo
            .get_appointment(id)?
            .ok_or(BookingError::AppointmentNotFound(id))?;
        if current.status == target {
            return Ok(StatusChange {
                appointment: id,
                status: target,
                changed: false,
            });
        }
        if !current.status.can_transition_to(target) {
            return Err(BookingError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let updated = self.repo.commit_status_change(id, target)?;
        Ok(StatusChange {
            appointment: updated.id,
            status: updated.status,
            changed: true,
        })
    }

    fn load_slot_for(
        &self,
        slot_id: &SlotId,
        professional_id: &ProfessionalId,
    ) -> BookingResult<TimeSlot> {
        let slot = self
            .repo
            .get_slot(slot_id)?
            .ok_or_else(|| BookingError::SlotNotFound(slot_id.clone()))?;
        if &slot.professional_id != professional_id {
            return Err(BookingError::SlotProfessionalMismatch {
                slot_id: slot.id,
                professional_id: professional_id.clone(),
            });
        }
        Ok(slot)
    }
}
