//! Atomic booking writes spanning slots and appointments.
//!
//! # Responsibility
//! - Combine slot and appointment access behind one repository.
//! - Run every booking-state mutation in a single transaction.
//!
//! # Invariants
//! - A slot is unavailable while a `scheduled` appointment holds it.
//! - A booking re-checks availability inside the same transaction that
//!   inserts the appointment and closes the slot.
//! - A failed commit leaves both tables untouched.

use super::appointment_repo::{
    self, AppointmentListQuery, AppointmentRepository, SqliteAppointmentRepository,
};
use super::slot_repo::{self, SlotListQuery, SlotRepository, SqliteSlotRepository};
use super::{RepoError, RepoResult};
use crate::model::appointment::{Appointment, AppointmentId, AppointmentStatus};
use crate::model::catalog::ProfessionalId;
use crate::model::slot::{SlotId, TimeSlot};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

/// Repository used by the booking service.
pub trait BookingRepository: SlotRepository + AppointmentRepository {
    /// Stores `appointment` and closes `slot_id`, or fails with `SlotConflict`.
    fn commit_booking(&self, appointment: &Appointment, slot_id: &SlotId) -> RepoResult<()>;

    /// Writes `status`; a cancellation also re-opens the held slot.
    ///
    /// Returns the stored appointment after the write.
    fn commit_status_change(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> RepoResult<Appointment>;

    /// Closes every stored slot currently held by a `scheduled` appointment.
    ///
    /// Returns the number of slots that were open and got closed.
    fn reconcile_held_slots(&self) -> RepoResult<usize>;
}

/// SQLite-backed booking repository over one connection.
pub struct SqliteBookingRepository<'conn> {
    conn: &'conn Connection,
    slots: SqliteSlotRepository<'conn>,
    appointments: SqliteAppointmentRepository<'conn>,
}

impl<'conn> SqliteBookingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            slots: SqliteSlotRepository::new(conn),
            appointments: SqliteAppointmentRepository::new(conn),
        }
    }
}

impl SlotRepository for SqliteBookingRepository<'_> {
    fn insert_slots(&self, slots: &[TimeSlot]) -> RepoResult<usize> {
        self.slots.insert_slots(slots)
    }

    fn get_slot(&self, id: &SlotId) -> RepoResult<Option<TimeSlot>> {
        self.slots.get_slot(id)
    }

    fn find_slot(
        &self,
        professional_id: &ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> RepoResult<Option<TimeSlot>> {
        self.slots.find_slot(professional_id, date, start_time)
    }

    fn list_slots(&self, query: &SlotListQuery) -> RepoResult<Vec<TimeSlot>> {
        self.slots.list_slots(query)
    }

    fn set_slot_availability(&self, id: &SlotId, is_available: bool) -> RepoResult<()> {
        self.slots.set_slot_availability(id, is_available)
    }
}

impl AppointmentRepository for SqliteBookingRepository<'_> {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        self.appointments.create_appointment(appointment)
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        self.appointments.get_appointment(id)
    }

    fn list_appointments(&self, query: &AppointmentListQuery) -> RepoResult<Vec<Appointment>> {
        self.appointments.list_appointments(query)
    }

    fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> RepoResult<()> {
        self.appointments.update_status(id, status)
    }

    fn find_active_appointment(
        &self,
        professional_id: &ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> RepoResult<Option<Appointment>> {
        self.appointments
            .find_active_appointment(professional_id, date, start_time)
    }
}

impl BookingRepository for SqliteBookingRepository<'_> {
    fn commit_booking(&self, appointment: &Appointment, slot_id: &SlotId) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let slot = slot_repo::get_slot(&tx, slot_id)?
            .ok_or_else(|| RepoError::SlotNotFound(slot_id.clone()))?;
        let held = appointment_repo::find_active_appointment(
            &tx,
            &slot.professional_id,
            slot.date,
            slot.start_time,
        )?;
        if !slot.is_available || held.is_some() {
            return Err(RepoError::SlotConflict(slot_id.clone()));
        }

        appointment_repo::create_appointment(&tx, appointment)?;
        slot_repo::set_slot_availability(&tx, slot_id, false)?;
        tx.commit()?;
        Ok(())
    }

    fn commit_status_change(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> RepoResult<Appointment> {
        let tx = self.conn.unchecked_transaction()?;

        appointment_repo::update_status(&tx, id, status)?;
        let appointment = appointment_repo::get_appointment(&tx, id)?
            .ok_or(RepoError::AppointmentNotFound(id))?;

        if status == AppointmentStatus::Cancelled {
            // Fixture appointments outside the generated window have no slot.
            if let Some(slot) = slot_repo::find_slot(
                &tx,
                &appointment.professional_id,
                appointment.date,
                appointment.start_time,
            )? {
                slot_repo::set_slot_availability(&tx, &slot.id, true)?;
            }
        }

        tx.commit()?;
        Ok(appointment)
    }

    fn reconcile_held_slots(&self) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE time_slots
             SET is_available = 0
             WHERE is_available = 1
               AND EXISTS (
                   SELECT 1 FROM appointments
                   WHERE appointments.professional_id = time_slots.professional_id
                     AND appointments.appt_date = time_slots.slot_date
                     AND appointments.start_time = time_slots.start_time
                     AND appointments.status = 'scheduled'
               );",
            [],
        )?;
        Ok(changed)
    }
}
