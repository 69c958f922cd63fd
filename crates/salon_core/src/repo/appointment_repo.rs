//! Appointment registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append appointments and update their status.
//! - Query by professional, date, status, in insertion or chronological order.
//!
//! # Invariants
//! - There is no delete path.
//! - Insertion order is the `seq` column, assigned on append.
//! - Storage refuses a second `scheduled` row for the same slot key.

use super::{date_to_db, parse_db_date, parse_db_time, time_to_db, RepoError, RepoResult};
use crate::model::appointment::{Appointment, AppointmentId, AppointmentStatus};
use crate::model::catalog::{ProfessionalId, ServiceId};
use crate::model::slot::SlotId;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use uuid::Uuid;

const APPOINTMENT_SELECT_SQL: &str = "SELECT
    uuid,
    client_name,
    client_phone,
    client_email,
    service_id,
    professional_id,
    appt_date,
    start_time,
    end_time,
    status,
    notes,
    created_at
FROM appointments";

/// Ordering for appointment listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppointmentOrder {
    /// Registry append order.
    #[default]
    Insertion,
    /// By date, then start time; ties keep append order.
    Chronological,
}

/// Filter options for listing appointments. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentListQuery {
    pub professional_id: Option<ProfessionalId>,
    pub date: Option<NaiveDate>,
    /// Inclusive lower date bound.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to_date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub order: AppointmentOrder,
}

/// Repository interface for the appointment registry.
pub trait AppointmentRepository {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId>;
    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>>;
    fn list_appointments(&self, query: &AppointmentListQuery) -> RepoResult<Vec<Appointment>>;
    fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> RepoResult<()>;
    /// Returns the `scheduled` appointment holding a slot key, if any.
    fn find_active_appointment(
        &self,
        professional_id: &ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> RepoResult<Option<Appointment>>;
}

/// SQLite-backed appointment registry.
pub struct SqliteAppointmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppointmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentRepository for SqliteAppointmentRepository<'_> {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        create_appointment(self.conn, appointment)
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        get_appointment(self.conn, id)
    }

    fn list_appointments(&self, query: &AppointmentListQuery) -> RepoResult<Vec<Appointment>> {
        list_appointments(self.conn, query)
    }

    fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> RepoResult<()> {
        update_status(self.conn, id, status)
    }

    fn find_active_appointment(
        &self,
        professional_id: &ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> RepoResult<Option<Appointment>> {
        find_active_appointment(self.conn, professional_id, date, start_time)
    }
}

pub(crate) fn create_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> RepoResult<AppointmentId> {
    appointment.validate()?;

    let result = conn.execute(
        "INSERT INTO appointments (
            uuid,
            client_name,
            client_phone,
            client_email,
            service_id,
            professional_id,
            appt_date,
            start_time,
            end_time,
            status,
            notes,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
        params![
            appointment.id.to_string(),
            appointment.client_name.as_str(),
            appointment.client_phone.as_str(),
            appointment.client_email.as_deref(),
            appointment.service_id.as_str(),
            appointment.professional_id.as_str(),
            date_to_db(appointment.date),
            time_to_db(appointment.start_time),
            time_to_db(appointment.end_time),
            appointment.status.as_str(),
            appointment.notes.as_deref(),
            appointment.created_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => Ok(appointment.id),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation
                && appointment.is_active() =>
        {
            Err(RepoError::SlotConflict(SlotId::derive(
                &appointment.professional_id,
                appointment.date,
                appointment.start_time,
            )))
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn get_appointment(
    conn: &Connection,
    id: AppointmentId,
) -> RepoResult<Option<Appointment>> {
    let mut stmt = conn.prepare(&format!("{APPOINTMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_appointment_row(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn list_appointments(
    conn: &Connection,
    query: &AppointmentListQuery,
) -> RepoResult<Vec<Appointment>> {
    let mut sql = format!("{APPOINTMENT_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(professional_id) = &query.professional_id {
        sql.push_str(" AND professional_id = ?");
        bind_values.push(Value::Text(professional_id.as_str().to_string()));
    }
    if let Some(date) = query.date {
        sql.push_str(" AND appt_date = ?");
        bind_values.push(Value::Text(date_to_db(date)));
    }
    if let Some(from_date) = query.from_date {
        sql.push_str(" AND appt_date >= ?");
        bind_values.push(Value::Text(date_to_db(from_date)));
    }
    if let Some(to_date) = query.to_date {
        sql.push_str(" AND appt_date <= ?");
        bind_values.push(Value::Text(date_to_db(to_date)));
    }
    if let Some(status) = query.status {
        sql.push_str(" AND status = ?");
        bind_values.push(Value::Text(status.as_str().to_string()));
    }

    match query.order {
        AppointmentOrder::Insertion => sql.push_str(" ORDER BY seq ASC"),
        AppointmentOrder::Chronological => {
            sql.push_str(" ORDER BY appt_date ASC, start_time ASC, seq ASC")
        }
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut appointments = Vec::new();
    while let Some(row) = rows.next()? {
        appointments.push(parse_appointment_row(row)?);
    }
    Ok(appointments)
}

pub(crate) fn update_status(
    conn: &Connection,
    id: AppointmentId,
    status: AppointmentStatus,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE appointments
         SET
            status = ?1,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?2;",
        params![status.as_str(), id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::AppointmentNotFound(id));
    }
    Ok(())
}

pub(crate) fn find_active_appointment(
    conn: &Connection,
    professional_id: &ProfessionalId,
    date: NaiveDate,
    start_time: NaiveTime,
) -> RepoResult<Option<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "{APPOINTMENT_SELECT_SQL}
         WHERE professional_id = ?1
           AND appt_date = ?2
           AND start_time = ?3
           AND status = 'scheduled';"
    ))?;
    let mut rows = stmt.query(params![
        professional_id.as_str(),
        date_to_db(date),
        time_to_db(start_time)
    ])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_appointment_row(row)?)),
        None => Ok(None),
    }
}

fn parse_appointment_row(row: &Row<'_>) -> RepoResult<Appointment> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid `{uuid_text}` in appointments.uuid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = AppointmentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in appointments.status"
        ))
    })?;

    let created_text: String = row.get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{created_text}` in appointments.created_at"
            ))
        })?;

    let date_text: String = row.get("appt_date")?;
    let start_text: String = row.get("start_time")?;
    let end_text: String = row.get("end_time")?;

    let appointment = Appointment {
        id,
        client_name: row.get("client_name")?,
        client_phone: row.get("client_phone")?,
        client_email: row.get("client_email")?,
        service_id: ServiceId::new(row.get::<_, String>("service_id")?),
        professional_id: ProfessionalId::new(row.get::<_, String>("professional_id")?),
        date: parse_db_date(&date_text, "appointments.appt_date")?,
        start_time: parse_db_time(&start_text, "appointments.start_time")?,
        end_time: parse_db_time(&end_text, "appointments.end_time")?,
        status,
        notes: row.get("notes")?,
        created_at,
    };
    appointment.validate()?;
    Ok(appointment)
}
