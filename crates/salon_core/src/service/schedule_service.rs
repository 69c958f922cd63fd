//! Read models for the calendar and day views.
//!
//! # Responsibility
//! - Summarize appointments and open slots per day of a month.
//! - Group one day's open slots and appointments per professional.
//! - List the agenda in chronological order.

use super::booking_service::{BookingError, BookingResult};
use crate::catalog::Catalog;
use crate::model::appointment::Appointment;
use crate::model::catalog::Professional;
use crate::model::slot::TimeSlot;
use crate::repo::appointment_repo::{AppointmentListQuery, AppointmentOrder};
use crate::repo::booking_repo::BookingRepository;
use crate::repo::slot_repo::SlotListQuery;
use chrono::{Months, NaiveDate};
use std::collections::BTreeMap;

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDaySummary {
    pub date: NaiveDate,
    pub is_today: bool,
    /// Appointments of any status on this date.
    pub appointment_count: usize,
    pub available_slot_count: usize,
}

/// One professional's column in the day view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessionalDaySchedule {
    pub professional: Professional,
    pub specialty_names: Vec<String>,
    /// Open slots, by start time.
    pub available_slots: Vec<TimeSlot>,
    /// The day's appointments of any status, by start time.
    pub appointments: Vec<Appointment>,
}

/// Read-only schedule queries.
pub struct ScheduleService<'a, R: BookingRepository> {
    repo: R,
    catalog: &'a Catalog,
}

impl<'a, R: BookingRepository> ScheduleService<'a, R> {
    pub fn new(repo: R, catalog: &'a Catalog) -> Self {
        Self { repo, catalog }
    }

    /// Per-day summary for every date of `year-month`.
    pub fn month_overview(
        &self,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> BookingResult<Vec<CalendarDaySummary>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(BookingError::InvalidMonth { year, month })?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(BookingError::InvalidMonth { year, month })?;

        let mut open_per_day = BTreeMap::<NaiveDate, usize>::new();
        for slot in self.repo.list_slots(&SlotListQuery {
            from_date: Some(first),
            to_date: Some(last),
            available_only: true,
            ..SlotListQuery::default()
        })? {
            *open_per_day.entry(slot.date).or_default() += 1;
        }

        let mut appointments_per_day = BTreeMap::<NaiveDate, usize>::new();
        for appointment in self.repo.list_appointments(&AppointmentListQuery {
            from_date: Some(first),
            to_date: Some(last),
            ..AppointmentListQuery::default()
        })? {
            *appointments_per_day.entry(appointment.date).or_default() += 1;
        }

        Ok(first
            .iter_days()
            .take_while(|date| *date <= last)
            .map(|date| CalendarDaySummary {
                date,
                is_today: date == today,
                appointment_count: appointments_per_day.get(&date).copied().unwrap_or(0),
                available_slot_count: open_per_day.get(&date).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Day view grouped per professional, in catalog order.
    pub fn day_schedule(&self, date: NaiveDate) -> BookingResult<Vec<ProfessionalDaySchedule>> {
        let open_slots = self.repo.list_slots(&SlotListQuery {
            date: Some(date),
            available_only: true,
            ..SlotListQuery::default()
        })?;
        let appointments = self.repo.list_appointments(&AppointmentListQuery {
            date: Some(date),
            order: AppointmentOrder::Chronological,
            ..AppointmentListQuery::default()
        })?;

        Ok(self
            .catalog
            .professionals()
            .iter()
            .map(|professional| {
                let mut available_slots = open_slots
                    .iter()
                    .filter(|slot| slot.professional_id == professional.id)
                    .cloned()
                    .collect::<Vec<_>>();
                available_slots.sort_by_key(|slot| slot.start_time);

                ProfessionalDaySchedule {
                    professional: professional.clone(),
                    specialty_names: self
                        .catalog
                        .specialty_names(&professional.id)
                        .into_iter()
                        .map(ToString::to_string)
                        .collect(),
                    available_slots,
                    appointments: appointments
                        .iter()
                        .filter(|appointment| appointment.professional_id == professional.id)
                        .cloned()
                        .collect(),
                }
            })
            .collect())
    }

    /// All appointments ordered by date and start time.
    pub fn agenda(&self) -> BookingResult<Vec<Appointment>> {
        Ok(self.repo.list_appointments(&AppointmentListQuery {
            order: AppointmentOrder::Chronological,
            ..AppointmentListQuery::default()
        })?)
    }
}
