//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented access to slots and appointments.
//! - Keep SQL details out of the booking service.
//!
//! # Invariants
//! - Writes validate records before any SQL mutation.
//! - Reads reject malformed stored rows instead of masking them.
//! - Booking and cancellation writes are atomic across both tables.

use crate::db::DbError;
use crate::model::appointment::AppointmentId;
use crate::model::slot::SlotId;
use crate::model::{ModelValidationError, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod appointment_repo;
pub mod booking_repo;
pub mod slot_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot and appointment storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    SlotNotFound(SlotId),
    AppointmentNotFound(AppointmentId),
    /// Slot is already closed or held by a scheduled appointment.
    SlotConflict(SlotId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::SlotNotFound(id) => write!(f, "time slot not found: {id}"),
            Self::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            Self::SlotConflict(id) => write!(f, "time slot is no longer available: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored booking data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn time_to_db(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(crate) fn parse_db_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

pub(crate) fn parse_db_time(value: &str, column: &str) -> RepoResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid time `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}
