//! Booking domain model.
//!
//! # Responsibility
//! - Define canonical records shared by catalog, slot and booking logic.
//! - Provide record-level validation used before any repository write.
//!
//! # Invariants
//! - Identifiers are stable; a slot id is derived, never assigned.
//! - Appointments are never deleted; status is the only post-create mutation.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod appointment;
pub mod catalog;
pub mod slot;

/// Shared `HH:MM` rendering for slot and appointment times.
pub(crate) const TIME_FORMAT: &str = "%H:%M";
/// Shared `YYYY-MM-DD` rendering for slot and appointment dates.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation errors for record-level invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
    /// Service duration must be strictly positive.
    NonPositiveDuration(u32),
    /// Record time range is empty or reversed.
    InvalidTimeRange { start: String, end: String },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::NonPositiveDuration(value) => {
                write!(f, "service duration must be positive, got {value}")
            }
            Self::InvalidTimeRange { start, end } => {
                write!(f, "end_time ({end}) must be later than start_time ({start})")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Trims optional free text and collapses blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(ToString::to_string)
}
