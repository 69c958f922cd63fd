//! Bookable time slot model.
//!
//! # Invariants
//! - `SlotId` is derived from `(professional_id, date, start_time)` only, so
//!   regenerating the same window yields the same ids.
//! - One slot belongs to exactly one professional and one date+time.

use super::catalog::ProfessionalId;
use super::{ModelValidationError, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Deterministic slot identifier, rendered as `"{professional}-{YYYY-MM-DD}-{HH:MM}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    /// Derives the slot id for one professional, date and start time.
    pub fn derive(professional_id: &ProfessionalId, date: NaiveDate, start_time: NaiveTime) -> Self {
        Self(format!(
            "{}-{}-{}",
            professional_id,
            date.format(DATE_FORMAT),
            start_time.format(TIME_FORMAT)
        ))
    }

    /// Wraps an already-rendered id, e.g. one received back from the UI.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bookable `(professional, date, time range)` unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub professional_id: ProfessionalId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Flips to `false` on booking and back to `true` on cancellation.
    pub is_available: bool,
}

impl TimeSlot {
    /// Creates a slot with its derived id.
    pub fn new(
        professional_id: ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        is_available: bool,
    ) -> Self {
        Self {
            id: SlotId::derive(&professional_id, date, start_time),
            professional_id,
            date,
            start_time,
            end_time,
            is_available,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.end_time <= self.start_time {
            return Err(ModelValidationError::InvalidTimeRange {
                start: self.start_time.format(TIME_FORMAT).to_string(),
                end: self.end_time.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(())
    }
}
