//! Owned booking context.
//!
//! # Responsibility
//! - Own the in-memory connection, the catalog and the scheduling config.
//! - Hand out booking and schedule services bound to that state.
//!
//! # Invariants
//! - All mutations go through `BookingService` entry points.
//! - State lives only as long as the store; nothing is persisted.

use crate::catalog::Catalog;
use crate::config::{ConfigError, SchedulingConfig};
use crate::db::{open_db_in_memory, DbError};
use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::model::catalog::{ProfessionalId, ServiceId};
use crate::repo::appointment_repo::AppointmentRepository;
use crate::repo::booking_repo::{BookingRepository, SqliteBookingRepository};
use crate::repo::slot_repo::SlotRepository;
use crate::repo::RepoError;
use crate::service::booking_service::{BookingResult, BookingService, GenerationSummary};
use crate::service::schedule_service::ScheduleService;
use crate::slots::availability::{AvailabilitySource, SeededAvailability};
use crate::slots::generator::SlotGenerator;
use chrono::{NaiveDate, NaiveTime, Utc};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store construction error.
#[derive(Debug)]
pub enum StoreError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ConfigError> for StoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// In-memory salon state: slots, appointments, catalog, config.
pub struct SalonStore {
    conn: Connection,
    catalog: Catalog,
    generator: SlotGenerator,
}

impl SalonStore {
    /// Opens an empty store. No slots are generated yet.
    pub fn open(catalog: Catalog, config: SchedulingConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            conn: open_db_in_memory()?,
            catalog,
            generator: SlotGenerator::new(config),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SchedulingConfig {
        self.generator.config()
    }

    pub fn booking(&self) -> BookingService<'_, SqliteBookingRepository<'_>> {
        BookingService::new(SqliteBookingRepository::new(&self.conn), &self.catalog)
    }

    pub fn schedule(&self) -> ScheduleService<'_, SqliteBookingRepository<'_>> {
        ScheduleService::new(SqliteBookingRepository::new(&self.conn), &self.catalog)
    }

    /// Generates the horizon from `start_date` with an explicit source.
    pub fn generate_slots_with(
        &self,
        start_date: NaiveDate,
        availability: &mut dyn AvailabilitySource,
    ) -> BookingResult<GenerationSummary> {
        self.booking()
            .generate_slots(&self.generator, start_date, availability)
    }

    /// Generates the horizon from `start_date` using the configured seed.
    ///
    /// Without a configured seed the draws come from OS entropy.
    pub fn generate_slots(&self, start_date: NaiveDate) -> BookingResult<GenerationSummary> {
        let config = self.generator.config();
        let mut availability = match config.seed {
            Some(seed) => SeededAvailability::new(seed, config.open_probability),
            None => SeededAvailability::from_entropy(config.open_probability),
        };
        self.generate_slots_with(start_date, &mut availability)
    }

    /// Adds the demo appointment shown on first launch.
    ///
    /// An open slot is booked through `commit_booking`. Without a slot, or
    /// on a slot already closed by the availability draw, the appointment is
    /// recorded and no slot changes. Skips seeding when the registry already
    /// has appointments.
    pub fn seed_demo_appointments(&self, today: NaiveDate) -> StoreResult<usize> {
        let repo = SqliteBookingRepository::new(&self.conn);
        if !repo.list_appointments(&Default::default())?.is_empty() {
            return Ok(0);
        }

        let mut seeded = 0;
        let mut booked = 0;
        for appointment in demo_appointments(today) {
            let slot = repo.find_slot(
                &appointment.professional_id,
                appointment.date,
                appointment.start_time,
            )?;
            match slot {
                Some(slot) if slot.is_available => {
                    repo.commit_booking(&appointment, &slot.id)?;
                    booked += 1;
                }
                _ => {
                    repo.create_appointment(&appointment)?;
                }
            }
            seeded += 1;
        }
        info!(
            "event=demo_seed module=store status=ok appointments={} booked_slots={}",
            seeded, booked
        );
        Ok(seeded)
    }
}

fn demo_appointments(today: NaiveDate) -> Vec<Appointment> {
    let (Some(start_time), Some(end_time)) = (
        NaiveTime::from_hms_opt(10, 0, 0),
        NaiveTime::from_hms_opt(11, 0, 0),
    ) else {
        return Vec::new();
    };

    vec![Appointment {
        id: Uuid::new_v4(),
        client_name: "João Silva".to_string(),
        client_phone: "(11) 99999-9999".to_string(),
        client_email: Some("joao@email.com".to_string()),
        service_id: ServiceId::new("1"),
        professional_id: ProfessionalId::new("1"),
        date: today,
        start_time,
        end_time,
        status: AppointmentStatus::Scheduled,
        notes: Some("Cliente preferencial".to_string()),
        created_at: Utc::now(),
    }]
}
