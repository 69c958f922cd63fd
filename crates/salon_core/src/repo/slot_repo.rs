//! Time slot repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Inserting an already-known slot id keeps the stored row untouched, so
//!   regenerating a window never resets booking state.
//! - Listing order is date ascending, then generation order within a day.

use super::{
    bool_to_int, date_to_db, int_to_bool, parse_db_date, parse_db_time, time_to_db, RepoError,
    RepoResult,
};
use crate::model::catalog::ProfessionalId;
use crate::model::slot::{SlotId, TimeSlot};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const SLOT_SELECT_SQL: &str = "SELECT
    id,
    professional_id,
    slot_date,
    start_time,
    end_time,
    is_available
FROM time_slots";

/// Filter options for listing slots. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotListQuery {
    pub date: Option<NaiveDate>,
    /// Inclusive lower date bound.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to_date: Option<NaiveDate>,
    pub professional_id: Option<ProfessionalId>,
    pub available_only: bool,
}

/// Repository interface for generated time slots.
pub trait SlotRepository {
    /// Stores new slots; returns how many were not already known.
    fn insert_slots(&self, slots: &[TimeSlot]) -> RepoResult<usize>;
    fn get_slot(&self, id: &SlotId) -> RepoResult<Option<TimeSlot>>;
    fn find_slot(
        &self,
        professional_id: &ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> RepoResult<Option<TimeSlot>>;
    fn list_slots(&self, query: &SlotListQuery) -> RepoResult<Vec<TimeSlot>>;
    fn set_slot_availability(&self, id: &SlotId, is_available: bool) -> RepoResult<()>;
}

/// SQLite-backed slot repository.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn insert_slots(&self, slots: &[TimeSlot]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = insert_slots(&tx, slots)?;
        tx.commit()?;
        Ok(inserted)
    }

    fn get_slot(&self, id: &SlotId) -> RepoResult<Option<TimeSlot>> {
        get_slot(self.conn, id)
    }

    fn find_slot(
        &self,
        professional_id: &ProfessionalId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> RepoResult<Option<TimeSlot>> {
        find_slot(self.conn, professional_id, date, start_time)
    }

    fn list_slots(&self, query: &SlotListQuery) -> RepoResult<Vec<TimeSlot>> {
        list_slots(self.conn, query)
    }

    fn set_slot_availability(&self, id: &SlotId, is_available: bool) -> RepoResult<()> {
        set_slot_availability(self.conn, id, is_available)
    }
}

pub(crate) fn insert_slots(conn: &Connection, slots: &[TimeSlot]) -> RepoResult<usize> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO time_slots (
            id,
            professional_id,
            slot_date,
            start_time,
            end_time,
            is_available
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?;

    let mut inserted = 0;
    for slot in slots {
        slot.validate()?;
        inserted += stmt.execute(params![
            slot.id.as_str(),
            slot.professional_id.as_str(),
            date_to_db(slot.date),
            time_to_db(slot.start_time),
            time_to_db(slot.end_time),
            bool_to_int(slot.is_available),
        ])?;
    }
    Ok(inserted)
}

pub(crate) fn get_slot(conn: &Connection, id: &SlotId) -> RepoResult<Option<TimeSlot>> {
    let mut stmt = conn.prepare(&format!("{SLOT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.as_str()])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_slot_row(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn find_slot(
    conn: &Connection,
    professional_id: &ProfessionalId,
    date: NaiveDate,
    start_time: NaiveTime,
) -> RepoResult<Option<TimeSlot>> {
    let id: Option<String> = conn
        .query_row(
            "SELECT id FROM time_slots
             WHERE professional_id = ?1 AND slot_date = ?2 AND start_time = ?3;",
            params![
                professional_id.as_str(),
                date_to_db(date),
                time_to_db(start_time)
            ],
            |row| row.get(0),
        )
        .optional()?;

    match id {
        Some(id) => get_slot(conn, &SlotId::from_raw(id)),
        None => Ok(None),
    }
}

pub(crate) fn list_slots(conn: &Connection, query: &SlotListQuery) -> RepoResult<Vec<TimeSlot>> {
    let mut sql = format!("{SLOT_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(date) = query.date {
        sql.push_str(" AND slot_date = ?");
        bind_values.push(Value::Text(date_to_db(date)));
    }
    if let Some(from_date) = query.from_date {
        sql.push_str(" AND slot_date >= ?");
        bind_values.push(Value::Text(date_to_db(from_date)));
    }
    if let Some(to_date) = query.to_date {
        sql.push_str(" AND slot_date <= ?");
        bind_values.push(Value::Text(date_to_db(to_date)));
    }
    if let Some(professional_id) = &query.professional_id {
        sql.push_str(" AND professional_id = ?");
        bind_values.push(Value::Text(professional_id.as_str().to_string()));
    }
    if query.available_only {
        sql.push_str(" AND is_available = 1");
    }
    sql.push_str(" ORDER BY slot_date ASC, rowid ASC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut slots = Vec::new();
    while let Some(row) = rows.next()? {
        slots.push(parse_slot_row(row)?);
    }
    Ok(slots)
}

pub(crate) fn set_slot_availability(
    conn: &Connection,
    id: &SlotId,
    is_available: bool,
) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE time_slots SET is_available = ?1 WHERE id = ?2;",
        params![bool_to_int(is_available), id.as_str()],
    )?;
    if changed == 0 {
        return Err(RepoError::SlotNotFound(id.clone()));
    }
    Ok(())
}

fn parse_slot_row(row: &Row<'_>) -> RepoResult<TimeSlot> {
    let date_text: String = row.get("slot_date")?;
    let start_text: String = row.get("start_time")?;
    let end_text: String = row.get("end_time")?;

    let slot = TimeSlot {
        id: SlotId::from_raw(row.get::<_, String>("id")?),
        professional_id: ProfessionalId::new(row.get::<_, String>("professional_id")?),
        date: parse_db_date(&date_text, "time_slots.slot_date")?,
        start_time: parse_db_time(&start_text, "time_slots.start_time")?,
        end_time: parse_db_time(&end_text, "time_slots.end_time")?,
        is_available: int_to_bool(row.get("is_available")?, "time_slots.is_available")?,
    };
    slot.validate()?;
    Ok(slot)
}
