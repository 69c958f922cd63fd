//! Catalog store: static services and professionals.
//!
//! # Responsibility
//! - Hold immutable reference data and answer lookups by id.
//! - Compute the services a professional can perform.
//!
//! # Invariants
//! - Service and professional ids are unique.
//! - Every specialty references a service present in the catalog, so
//!   renaming a service never breaks eligibility.
//! - Listing order is the declaration order.

use crate::model::catalog::{Professional, ProfessionalId, Service, ServiceId};
use crate::model::ModelValidationError;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Catalog construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    InvalidRecord(ModelValidationError),
    DuplicateServiceId(ServiceId),
    DuplicateProfessionalId(ProfessionalId),
    /// A professional declares a specialty that is not a known service.
    UnknownSpecialty {
        professional_id: ProfessionalId,
        service_id: ServiceId,
    },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord(err) => write!(f, "invalid catalog record: {err}"),
            Self::DuplicateServiceId(id) => write!(f, "duplicate service id `{id}`"),
            Self::DuplicateProfessionalId(id) => {
                write!(f, "duplicate professional id `{id}`")
            }
            Self::UnknownSpecialty {
                professional_id,
                service_id,
            } => write!(
                f,
                "professional `{professional_id}` declares unknown service `{service_id}`"
            ),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for CatalogError {
    fn from(value: ModelValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

/// Validated, read-only service/professional catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    services: Vec<Service>,
    professionals: Vec<Professional>,
}

impl Catalog {
    /// Builds a catalog after validating all records and references.
    pub fn new(
        services: Vec<Service>,
        professionals: Vec<Professional>,
    ) -> Result<Self, CatalogError> {
        let mut service_ids = BTreeSet::new();
        for service in &services {
            service.validate()?;
            if !service_ids.insert(service.id.clone()) {
                return Err(CatalogError::DuplicateServiceId(service.id.clone()));
            }
        }

        let mut professional_ids = BTreeSet::new();
        for professional in &professionals {
            professional.validate()?;
            if !professional_ids.insert(professional.id.clone()) {
                return Err(CatalogError::DuplicateProfessionalId(
                    professional.id.clone(),
                ));
            }
            if let Some(unknown) = professional
                .specialties
                .iter()
                .find(|service_id| !service_ids.contains(*service_id))
            {
                return Err(CatalogError::UnknownSpecialty {
                    professional_id: professional.id.clone(),
                    service_id: unknown.clone(),
                });
            }
        }

        Ok(Self {
            services,
            professionals,
        })
    }

    /// Default salon catalog: six services, three professionals.
    pub fn salon_default() -> Self {
        Self {
            services: default_services(),
            professionals: default_professionals(),
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn professionals(&self) -> &[Professional] {
        &self.professionals
    }

    pub fn service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|service| &service.id == id)
    }

    pub fn professional(&self, id: &ProfessionalId) -> Option<&Professional> {
        self.professionals
            .iter()
            .find(|professional| &professional.id == id)
    }

    /// Services the professional performs, in catalog order.
    ///
    /// Returns an empty list for unknown professionals.
    pub fn eligible_services(&self, professional_id: &ProfessionalId) -> Vec<&Service> {
        let Some(professional) = self.professional(professional_id) else {
            return Vec::new();
        };
        self.services
            .iter()
            .filter(|service| professional.offers(&service.id))
            .collect()
    }

    /// Display names of the professional's specialties, in declared order.
    pub fn specialty_names(&self, professional_id: &ProfessionalId) -> Vec<&str> {
        let Some(professional) = self.professional(professional_id) else {
            return Vec::new();
        };
        professional
            .specialties
            .iter()
            .filter_map(|service_id| self.service(service_id))
            .map(|service| service.name.as_str())
            .collect()
    }
}

fn service(id: &str, name: &str, duration_minutes: u32, price: u32, description: &str) -> Service {
    Service {
        id: ServiceId::new(id),
        name: name.to_string(),
        duration_minutes,
        price,
        description: Some(description.to_string()),
    }
}

fn professional(id: &str, name: &str, specialties: &[&str], avatar: &str) -> Professional {
    Professional {
        id: ProfessionalId::new(id),
        name: name.to_string(),
        specialties: specialties.iter().map(|id| ServiceId::new(*id)).collect(),
        avatar: Some(avatar.to_string()),
    }
}

fn default_services() -> Vec<Service> {
    vec![
        service("1", "Corte Feminino", 60, 80, "Corte personalizado com lavagem e finalização"),
        service("2", "Corte Masculino", 30, 40, "Corte tradicional ou moderno"),
        service("3", "Coloração", 120, 150, "Coloração completa com produtos de qualidade"),
        service("4", "Escova", 45, 50, "Escova modeladora com finalização"),
        service("5", "Manicure", 45, 35, "Cuidados completos para as unhas"),
        service("6", "Pedicure", 60, 45, "Cuidados completos para os pés"),
    ]
}

fn default_professionals() -> Vec<Professional> {
    vec![
        professional(
            "1",
            "Ana Silva",
            &["1", "3", "4"],
            "https://images.pexels.com/photos/3992656/pexels-photo-3992656.jpeg?auto=compress&cs=tinysrgb&w=150",
        ),
        professional(
            "2",
            "Carlos Santos",
            &["2", "1"],
            "https://images.pexels.com/photos/2379004/pexels-photo-2379004.jpeg?auto=compress&cs=tinysrgb&w=150",
        ),
        professional(
            "3",
            "Maria Oliveira",
            &["5", "6"],
            "https://images.pexels.com/photos/1239291/pexels-photo-1239291.jpeg?auto=compress&cs=tinysrgb&w=150",
        ),
    ]
}
