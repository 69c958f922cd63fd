//! Core booking logic for the salon scheduler.
//! This crate is the single source of truth for slot and appointment invariants.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod slots;
pub mod store;

pub use catalog::{Catalog, CatalogError};
pub use config::{ConfigError, LoggingConfig, SalonConfig, SchedulingConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::appointment::{Appointment, AppointmentId, AppointmentStatus, ClientDetails};
pub use model::catalog::{Professional, ProfessionalId, Service, ServiceId};
pub use model::slot::{SlotId, TimeSlot};
pub use model::ModelValidationError;
pub use repo::appointment_repo::{
    AppointmentListQuery, AppointmentOrder, AppointmentRepository, SqliteAppointmentRepository,
};
pub use repo::booking_repo::{BookingRepository, SqliteBookingRepository};
pub use repo::slot_repo::{SlotListQuery, SlotRepository, SqliteSlotRepository};
pub use repo::{RepoError, RepoResult};
pub use service::booking_service::{
    BookingContext, BookingError, BookingRequest, BookingResult, BookingService,
    GenerationSummary, Notice, StatusChange,
};
pub use service::schedule_service::{CalendarDaySummary, ProfessionalDaySchedule, ScheduleService};
pub use slots::availability::{
    AlwaysAvailable, AvailabilitySource, FixedAvailability, SeededAvailability,
};
pub use slots::generator::SlotGenerator;
pub use store::{SalonStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
