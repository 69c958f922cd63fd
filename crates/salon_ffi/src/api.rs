//! FFI use-case API for the booking UI.
//!
//! # Responsibility
//! - Expose query and command functions to Dart via FRB.
//! - Map core outcomes to stable codes and pt-BR user messages.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - One process-wide in-memory store backs every call.
//! - Dates cross the boundary as `YYYY-MM-DD`, times as `HH:MM`.

use chrono::{Local, NaiveDate};
use log::error;
use salon_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Appointment,
    AppointmentListQuery, AppointmentOrder, AppointmentStatus, BookingError, BookingRequest,
    Catalog, Notice, ProfessionalId, SalonConfig, SalonStore, Service, ServiceId, SlotId,
    SlotListQuery, TimeSlot,
};
use std::sync::{Mutex, OnceLock, PoisonError};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

static STORE: OnceLock<Mutex<SalonStore>> = OnceLock::new();

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Catalog service row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price: u32,
    pub description: Option<String>,
}

/// Catalog professional row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessionalItem {
    pub id: String,
    pub name: String,
    /// Specialty display names, in declared order.
    pub specialties: Vec<String>,
    pub avatar: Option<String>,
}

/// Time slot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotItem {
    pub id: String,
    pub professional_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

/// Appointment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentItem {
    pub id: String,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub service_id: String,
    pub professional_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Stable status id (`scheduled|completed|cancelled`).
    pub status: String,
    /// pt-BR status label.
    pub status_label: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Month grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayItem {
    pub date: String,
    pub is_today: bool,
    pub appointment_count: u32,
    pub available_slot_count: u32,
}

/// Day view column for one professional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessionalDayItem {
    pub professional: ProfessionalItem,
    pub available_slots: Vec<SlotItem>,
    pub appointments: Vec<AppointmentItem>,
}

/// Slot list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotListResponse {
    pub ok: bool,
    /// Matching slots, date then start time.
    pub items: Vec<SlotItem>,
    /// Machine code on failure, empty on success.
    pub code: String,
    pub message: String,
}

impl SlotListResponse {
    fn success(items: Vec<SlotItem>) -> Self {
        Self {
            ok: true,
            message: result_message(items.len()),
            items,
            code: String::new(),
        }
    }

    fn failure(failure: Failure) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            code: failure.code.to_string(),
            message: failure.message,
        }
    }
}

/// Appointment list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentListResponse {
    pub ok: bool,
    /// Matching appointments, chronological.
    pub items: Vec<AppointmentItem>,
    /// Machine code on failure, empty on success.
    pub code: String,
    pub message: String,
}

impl AppointmentListResponse {
    fn success(items: Vec<AppointmentItem>) -> Self {
        Self {
            ok: true,
            message: result_message(items.len()),
            items,
            code: String::new(),
        }
    }

    fn failure(failure: Failure) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            code: failure.code.to_string(),
            message: failure.message,
        }
    }
}

/// Month grid response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOverviewResponse {
    pub ok: bool,
    /// One cell per calendar day of the month.
    pub days: Vec<CalendarDayItem>,
    /// Machine code on failure, empty on success.
    pub code: String,
    pub message: String,
}

impl MonthOverviewResponse {
    fn success(days: Vec<CalendarDayItem>) -> Self {
        Self {
            ok: true,
            message: result_message(days.len()),
            days,
            code: String::new(),
        }
    }

    fn failure(failure: Failure) -> Self {
        Self {
            ok: false,
            days: Vec::new(),
            code: failure.code.to_string(),
            message: failure.message,
        }
    }
}

/// Day view response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayScheduleResponse {
    pub ok: bool,
    /// One column per professional, catalog order.
    pub professionals: Vec<ProfessionalDayItem>,
    /// Machine code on failure, empty on success.
    pub code: String,
    pub message: String,
}

impl DayScheduleResponse {
    fn success(professionals: Vec<ProfessionalDayItem>) -> Self {
        Self {
            ok: true,
            message: result_message(professionals.len()),
            professionals,
            code: String::new(),
        }
    }

    fn failure(failure: Failure) -> Self {
        Self {
            ok: false,
            professionals: Vec::new(),
            code: failure.code.to_string(),
            message: failure.message,
        }
    }
}

/// Command response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Stable success or failure code.
    pub code: String,
    /// Affected appointment id, when known.
    pub appointment_id: Option<String>,
    /// pt-BR message for the toast.
    pub message: String,
}

impl ActionResponse {
    fn success(notice: Notice, appointment_id: Uuid) -> Self {
        Self {
            ok: true,
            code: notice.code().to_string(),
            appointment_id: Some(appointment_id.to_string()),
            message: notice_message(notice).to_string(),
        }
    }

    fn failure(failure: Failure) -> Self {
        Self {
            ok: false,
            code: failure.code.to_string(),
            appointment_id: None,
            message: failure.message,
        }
    }
}

/// Booking form payload returned when a slot is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFormResponse {
    pub ok: bool,
    pub code: String,
    pub message: String,
    pub slot: Option<SlotItem>,
    pub professional: Option<ProfessionalItem>,
    /// Services the professional performs.
    pub services: Vec<ServiceItem>,
}

struct Failure {
    code: &'static str,
    message: String,
}

impl From<BookingError> for Failure {
    fn from(value: BookingError) -> Self {
        if let BookingError::Repo(err) = &value {
            error!("event=ffi_call module=ffi status=error error={err}");
        }
        Self {
            code: value.code(),
            message: booking_error_message(&value).to_string(),
        }
    }
}

/// Lists catalog services.
#[flutter_rust_bridge::frb(sync)]
pub fn list_services() -> Vec<ServiceItem> {
    with_store(|store| {
        Ok(store
            .catalog()
            .services()
            .iter()
            .map(to_service_item)
            .collect())
    })
    .unwrap_or_default()
}

/// Lists services a professional performs, in catalog order.
///
/// Unknown professionals yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn eligible_services(professional_id: String) -> Vec<ServiceItem> {
    let professional_id = ProfessionalId::new(professional_id.trim());
    with_store(|store| {
        Ok(store
            .catalog()
            .eligible_services(&professional_id)
            .into_iter()
            .map(to_service_item)
            .collect())
    })
    .unwrap_or_default()
}

/// Lists catalog professionals.
#[flutter_rust_bridge::frb(sync)]
pub fn list_professionals() -> Vec<ProfessionalItem> {
    with_store(|store| {
        Ok(store
            .catalog()
            .professionals()
            .iter()
            .map(|professional| to_professional_item(store.catalog(), &professional.id))
            .collect())
    })
    .unwrap_or_default()
}

/// Lists slots, optionally filtered by date, professional and availability.
#[flutter_rust_bridge::frb(sync)]
pub fn list_slots(
    date: Option<String>,
    professional_id: Option<String>,
    available_only: bool,
) -> SlotListResponse {
    let date = match parse_optional_date(date) {
        Ok(date) => date,
        Err(failure) => return SlotListResponse::failure(failure),
    };
    let query = SlotListQuery {
        date,
        professional_id: non_empty(professional_id).map(ProfessionalId::new),
        available_only,
        ..SlotListQuery::default()
    };

    match with_store(|store| {
        let slots = store.booking().list_slots(&query)?;
        Ok(slots.iter().map(to_slot_item).collect())
    }) {
        Ok(items) => SlotListResponse::success(items),
        Err(failure) => SlotListResponse::failure(failure),
    }
}

/// Lists appointments chronologically, optionally filtered.
///
/// `status` accepts `scheduled|completed|cancelled`.
#[flutter_rust_bridge::frb(sync)]
pub fn list_appointments(
    date: Option<String>,
    professional_id: Option<String>,
    status: Option<String>,
) -> AppointmentListResponse {
    let date = match parse_optional_date(date) {
        Ok(date) => date,
        Err(failure) => return AppointmentListResponse::failure(failure),
    };
    let status = match non_empty(status) {
        Some(raw) => match AppointmentStatus::parse(&raw) {
            Some(status) => Some(status),
            None => return AppointmentListResponse::failure(invalid_status()),
        },
        None => None,
    };
    let query = AppointmentListQuery {
        date,
        professional_id: non_empty(professional_id).map(ProfessionalId::new),
        status,
        order: AppointmentOrder::Chronological,
        ..AppointmentListQuery::default()
    };

    match with_store(|store| {
        let appointments = store.booking().list_appointments(&query)?;
        Ok(appointments.iter().map(to_appointment_item).collect())
    }) {
        Ok(items) => AppointmentListResponse::success(items),
        Err(failure) => AppointmentListResponse::failure(failure),
    }
}

/// Month grid summary for `year-month`.
#[flutter_rust_bridge::frb(sync)]
pub fn month_overview(year: i32, month: u32) -> MonthOverviewResponse {
    let today = Local::now().date_naive();
    match with_store(|store| {
        let days = store.schedule().month_overview(year, month, today)?;
        Ok(days
            .into_iter()
            .map(|day| CalendarDayItem {
                date: day.date.format(DATE_FORMAT).to_string(),
                is_today: day.is_today,
                appointment_count: saturating_u32(day.appointment_count),
                available_slot_count: saturating_u32(day.available_slot_count),
            })
            .collect())
    }) {
        Ok(items) => MonthOverviewResponse::success(items),
        Err(failure) => MonthOverviewResponse::failure(failure),
    }
}

/// Day view: open slots and appointments per professional.
#[flutter_rust_bridge::frb(sync)]
pub fn day_schedule(date: String) -> DayScheduleResponse {
    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(failure) => return DayScheduleResponse::failure(failure),
    };
    match with_store(|store| {
        let columns = store.schedule().day_schedule(date)?;
        Ok(columns
            .into_iter()
            .map(|column| ProfessionalDayItem {
                professional: to_professional_item(store.catalog(), &column.professional.id),
                available_slots: column.available_slots.iter().map(to_slot_item).collect(),
                appointments: column.appointments.iter().map(to_appointment_item).collect(),
            })
            .collect())
    }) {
        Ok(items) => DayScheduleResponse::success(items),
        Err(failure) => DayScheduleResponse::failure(failure),
    }
}

/// Opens the booking form for a slot.
#[flutter_rust_bridge::frb(sync)]
pub fn select_slot(slot_id: String, professional_id: String) -> BookingFormResponse {
    let result = with_store(|store| {
        let context = store.booking().select_slot(
            &SlotId::from_raw(slot_id.trim()),
            &ProfessionalId::new(professional_id.trim()),
        )?;
        Ok(BookingFormResponse {
            ok: true,
            code: String::new(),
            message: String::new(),
            slot: Some(to_slot_item(&context.slot)),
            professional: Some(to_professional_item(
                store.catalog(),
                &context.professional.id,
            )),
            services: context
                .services
                .iter()
                .map(to_service_item)
                .collect(),
        })
    });

    result.unwrap_or_else(|failure| BookingFormResponse {
        ok: false,
        code: failure.code.to_string(),
        message: failure.message,
        slot: None,
        professional: None,
        services: Vec::new(),
    })
}

/// Confirms a booking from the form.
#[flutter_rust_bridge::frb(sync)]
pub fn confirm_booking(
    slot_id: String,
    professional_id: String,
    service_id: String,
    client_name: String,
    client_phone: String,
    client_email: Option<String>,
    notes: Option<String>,
) -> ActionResponse {
    let request = BookingRequest {
        slot_id: SlotId::from_raw(slot_id.trim()),
        professional_id: ProfessionalId::new(professional_id.trim()),
        service_id: ServiceId::new(service_id.trim()),
        client_name,
        client_phone,
        client_email,
        notes,
    };
    match with_store(|store| Ok(store.booking().confirm_booking(&request)?)) {
        Ok(appointment) => ActionResponse::success(Notice::BookingConfirmed, appointment.id),
        Err(failure) => ActionResponse::failure(failure),
    }
}

/// Marks an appointment `completed` or `cancelled`.
#[flutter_rust_bridge::frb(sync)]
pub fn change_status(appointment_id: String, status: String) -> ActionResponse {
    let Ok(id) = Uuid::parse_str(appointment_id.trim()) else {
        return ActionResponse::failure(Failure {
            code: "invalid_appointment_id",
            message: "Agendamento não encontrado.".to_string(),
        });
    };
    let Some(target) = AppointmentStatus::parse(&status) else {
        return ActionResponse::failure(invalid_status());
    };

    match with_store(|store| Ok(store.booking().change_status(id, target)?)) {
        Ok(change) => ActionResponse::success(change.notice(), change.appointment),
        Err(failure) => ActionResponse::failure(failure),
    }
}

/// pt-BR label for a stable status id; unknown ids are echoed back.
#[flutter_rust_bridge::frb(sync)]
pub fn status_label(status: String) -> String {
    match AppointmentStatus::parse(&status) {
        Some(status) => status_label_for(status).to_string(),
        None => status,
    }
}

fn with_store<T>(f: impl FnOnce(&SalonStore) -> Result<T, Failure>) -> Result<T, Failure> {
    let store = match STORE.get() {
        Some(store) => store,
        None => {
            let opened = open_store()?;
            STORE.get_or_init(|| Mutex::new(opened))
        }
    };
    let guard = store.lock().unwrap_or_else(PoisonError::into_inner);
    f(&guard)
}

fn open_store() -> Result<SalonStore, Failure> {
    let bootstrap_failure = |err: String| {
        error!("event=store_open module=ffi status=error error={err}");
        Failure {
            code: "store_unavailable",
            message: "Não foi possível carregar a agenda.".to_string(),
        }
    };

    let config = SalonConfig::from_env().map_err(|err| bootstrap_failure(err.to_string()))?;
    let store = SalonStore::open(Catalog::salon_default(), config.scheduling)
        .map_err(|err| bootstrap_failure(err.to_string()))?;

    let today = Local::now().date_naive();
    store
        .generate_slots(today)
        .map_err(|err| bootstrap_failure(err.to_string()))?;
    store
        .seed_demo_appointments(today)
        .map_err(|err| bootstrap_failure(err.to_string()))?;
    Ok(store)
}

fn to_professional_item(catalog: &Catalog, id: &ProfessionalId) -> ProfessionalItem {
    let professional = catalog.professional(id);
    ProfessionalItem {
        id: id.to_string(),
        name: professional
            .map(|professional| professional.name.clone())
            .unwrap_or_default(),
        specialties: catalog
            .specialty_names(id)
            .into_iter()
            .map(ToString::to_string)
            .collect(),
        avatar: professional.and_then(|professional| professional.avatar.clone()),
    }
}

fn to_service_item(service: &Service) -> ServiceItem {
    ServiceItem {
        id: service.id.to_string(),
        name: service.name.clone(),
        duration_minutes: service.duration_minutes,
        price: service.price,
        description: service.description.clone(),
    }
}

fn to_slot_item(slot: &TimeSlot) -> SlotItem {
    SlotItem {
        id: slot.id.to_string(),
        professional_id: slot.professional_id.to_string(),
        date: slot.date.format(DATE_FORMAT).to_string(),
        start_time: slot.start_time.format(TIME_FORMAT).to_string(),
        end_time: slot.end_time.format(TIME_FORMAT).to_string(),
        is_available: slot.is_available,
    }
}

fn to_appointment_item(appointment: &Appointment) -> AppointmentItem {
    AppointmentItem {
        id: appointment.id.to_string(),
        client_name: appointment.client_name.clone(),
        client_phone: appointment.client_phone.clone(),
        client_email: appointment.client_email.clone(),
        service_id: appointment.service_id.to_string(),
        professional_id: appointment.professional_id.to_string(),
        date: appointment.date.format(DATE_FORMAT).to_string(),
        start_time: appointment.start_time.format(TIME_FORMAT).to_string(),
        end_time: appointment.end_time.format(TIME_FORMAT).to_string(),
        status: appointment.status.as_str().to_string(),
        status_label: status_label_for(appointment.status).to_string(),
        notes: appointment.notes.clone(),
        created_at: appointment.created_at.to_rfc3339(),
    }
}

fn notice_message(notice: Notice) -> &'static str {
    match notice {
        Notice::BookingConfirmed => "Agendamento realizado com sucesso!",
        Notice::AppointmentCompleted => "Agendamento concluído com sucesso!",
        Notice::AppointmentCancelled => "Agendamento cancelado com sucesso!",
    }
}

fn status_label_for(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "Agendado",
        AppointmentStatus::Completed => "Concluído",
        AppointmentStatus::Cancelled => "Cancelado",
    }
}

fn booking_error_message(err: &BookingError) -> &'static str {
    match err {
        BookingError::EmptyClientName => "Informe o nome do cliente.",
        BookingError::EmptyClientPhone => "Informe o telefone do cliente.",
        BookingError::MissingService => "Selecione um serviço.",
        BookingError::UnknownService(_) => "Serviço não encontrado.",
        BookingError::UnknownProfessional(_) => "Profissional não encontrado.",
        BookingError::ServiceNotOffered { .. } => {
            "Este profissional não realiza o serviço selecionado."
        }
        BookingError::SlotNotFound(_) => "Horário não encontrado.",
        BookingError::SlotProfessionalMismatch { .. } => {
            "Este horário não pertence ao profissional selecionado."
        }
        BookingError::SlotUnavailable(_) => "Este horário não está mais disponível.",
        BookingError::AppointmentNotFound(_) => "Agendamento não encontrado.",
        BookingError::InvalidTransition { .. } => "Este agendamento já foi finalizado.",
        BookingError::InvalidTargetStatus(_) => "Status inválido.",
        BookingError::InvalidMonth { .. } => "Mês inválido.",
        BookingError::Repo(_) => "Não foi possível concluir a operação.",
    }
}

fn invalid_status() -> Failure {
    Failure {
        code: "invalid_status",
        message: "Status inválido.".to_string(),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, Failure> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| Failure {
        code: "invalid_date",
        message: "Data inválida.".to_string(),
    })
}

fn parse_optional_date(raw: Option<String>) -> Result<Option<NaiveDate>, Failure> {
    non_empty(raw).map(|value| parse_date(&value)).transpose()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn result_message(count: usize) -> String {
    if count == 0 {
        "Nenhum resultado.".to_string()
    } else {
        format!("{count} resultado(s).")
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
