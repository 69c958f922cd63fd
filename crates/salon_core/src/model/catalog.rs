//! Catalog reference records: services and professionals.
//!
//! # Invariants
//! - Records are immutable reference data once loaded into a `Catalog`.
//! - A professional's specialties reference services by id, not by name.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable service identifier (`"1"`, `"2"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ServiceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable professional identifier (`"1"`, `"2"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfessionalId(String);

impl ProfessionalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ProfessionalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bookable salon service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    /// Duration in minutes. Must be > 0.
    pub duration_minutes: u32,
    /// Price in whole currency units (BRL).
    pub price: u32,
    pub description: Option<String>,
}

impl Service {
    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ModelValidationError::EmptyField("service.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyField("service.name"));
        }
        if self.duration_minutes == 0 {
            return Err(ModelValidationError::NonPositiveDuration(
                self.duration_minutes,
            ));
        }
        Ok(())
    }
}

/// A salon professional and the services they perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: ProfessionalId,
    pub name: String,
    /// Services this professional performs, in display order.
    pub specialties: Vec<ServiceId>,
    /// Avatar image reference (URL) for the presentation layer.
    pub avatar: Option<String>,
}

impl Professional {
    /// Returns whether this professional performs `service_id`.
    pub fn offers(&self, service_id: &ServiceId) -> bool {
        self.specialties.contains(service_id)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ModelValidationError::EmptyField("professional.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::EmptyField("professional.name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Professional, ProfessionalId, Service, ServiceId};
    use crate::model::ModelValidationError;

    fn service(duration_minutes: u32) -> Service {
        Service {
            id: ServiceId::new("9"),
            name: "Hidratação".to_string(),
            duration_minutes,
            price: 60,
            description: None,
        }
    }

    #[test]
    fn service_rejects_zero_duration() {
        let err = service(0).validate().expect_err("zero duration must fail");
        assert_eq!(err, ModelValidationError::NonPositiveDuration(0));
        assert!(service(30).validate().is_ok());
    }

    #[test]
    fn professional_offers_is_id_based() {
        let professional = Professional {
            id: ProfessionalId::new("7"),
            name: "Bia".to_string(),
            specialties: vec![ServiceId::new("1"), ServiceId::new("4")],
            avatar: None,
        };
        assert!(professional.offers(&ServiceId::new("4")));
        assert!(!professional.offers(&ServiceId::new("2")));
    }
}
