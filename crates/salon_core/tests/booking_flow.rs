use chrono::{NaiveDate, NaiveTime};
use salon_core::{
    AlwaysAvailable, AppointmentListQuery, AppointmentStatus, BookingError, BookingRequest,
    Catalog, FixedAvailability, Notice, ProfessionalId, SalonStore, SchedulingConfig, ServiceId,
    SlotId, SlotListQuery, TimeSlot,
};
use uuid::Uuid;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn ten_am() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap()
}

fn open_store() -> SalonStore {
    let store = SalonStore::open(Catalog::salon_default(), SchedulingConfig::default()).unwrap();
    store
        .generate_slots_with(monday(), &mut AlwaysAvailable)
        .unwrap();
    store
}

fn ana() -> ProfessionalId {
    ProfessionalId::new("1")
}

fn ana_ten_am() -> SlotId {
    SlotId::derive(&ana(), monday(), ten_am())
}

fn maria_request() -> BookingRequest {
    BookingRequest {
        slot_id: ana_ten_am(),
        professional_id: ana(),
        service_id: ServiceId::new("1"),
        client_name: "Maria".to_string(),
        client_phone: "11999999999".to_string(),
        client_email: None,
        notes: None,
    }
}

fn slot(store: &SalonStore, id: &SlotId) -> TimeSlot {
    store
        .booking()
        .list_slots(&SlotListQuery {
            date: Some(monday()),
            ..SlotListQuery::default()
        })
        .unwrap()
        .into_iter()
        .find(|slot| &slot.id == id)
        .unwrap()
}

fn all_slots(store: &SalonStore) -> Vec<TimeSlot> {
    store
        .booking()
        .list_slots(&SlotListQuery::default())
        .unwrap()
}

fn appointment_count(store: &SalonStore) -> usize {
    store
        .booking()
        .list_appointments(&AppointmentListQuery::default())
        .unwrap()
        .len()
}

#[test]
fn confirming_ana_silva_slot_creates_scheduled_appointment_and_closes_slot() {
    let store = open_store();
    let booking = store.booking();

    let context = booking.select_slot(&ana_ten_am(), &ana()).unwrap();
    assert_eq!(context.professional.name, "Ana Silva");
    let offered = context
        .services
        .iter()
        .map(|service| service.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(offered, vec!["Corte Feminino", "Coloração", "Escova"]);

    let appointment = booking.confirm_booking(&maria_request()).unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.client_name, "Maria");
    assert_eq!(appointment.date, monday());
    assert_eq!(appointment.start_time, ten_am());
    assert_eq!(appointment.end_time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());

    assert!(!slot(&store, &ana_ten_am()).is_available);
    assert_eq!(appointment_count(&store), 1);
}

#[test]
fn empty_client_name_creates_nothing_and_keeps_slots() {
    let store = open_store();
    let before = all_slots(&store);

    let request = BookingRequest {
        client_name: "  ".to_string(),
        ..maria_request()
    };
    let err = store.booking().confirm_booking(&request).unwrap_err();
    assert!(matches!(err, BookingError::EmptyClientName));
    assert!(err.is_validation());

    assert_eq!(appointment_count(&store), 0);
    assert_eq!(all_slots(&store), before);
}

#[test]
fn missing_phone_or_unknown_service_is_rejected() {
    let store = open_store();
    let booking = store.booking();

    let no_phone = BookingRequest {
        client_phone: String::new(),
        ..maria_request()
    };
    assert!(matches!(
        booking.confirm_booking(&no_phone).unwrap_err(),
        BookingError::EmptyClientPhone
    ));

    let no_service = BookingRequest {
        service_id: ServiceId::new(""),
        ..maria_request()
    };
    assert!(matches!(
        booking.confirm_booking(&no_service).unwrap_err(),
        BookingError::MissingService
    ));

    let unknown = BookingRequest {
        service_id: ServiceId::new("42"),
        ..maria_request()
    };
    assert!(matches!(
        booking.confirm_booking(&unknown).unwrap_err(),
        BookingError::UnknownService(_)
    ));

    assert_eq!(appointment_count(&store), 0);
    assert!(slot(&store, &ana_ten_am()).is_available);
}

#[test]
fn service_outside_specialties_is_rejected() {
    let store = open_store();
    let manicure = BookingRequest {
        service_id: ServiceId::new("5"),
        ..maria_request()
    };
    let err = store.booking().confirm_booking(&manicure).unwrap_err();
    assert_eq!(err.code(), "service_not_offered");
    assert_eq!(appointment_count(&store), 0);
}

#[test]
fn slot_of_another_professional_is_rejected() {
    let store = open_store();
    let wrong_owner = BookingRequest {
        professional_id: ProfessionalId::new("2"),
        ..maria_request()
    };
    let err = store.booking().confirm_booking(&wrong_owner).unwrap_err();
    assert!(matches!(err, BookingError::SlotProfessionalMismatch { .. }));

    let err = store
        .booking()
        .select_slot(&ana_ten_am(), &ProfessionalId::new("2"))
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotProfessionalMismatch { .. }));
}

#[test]
fn booking_an_unavailable_slot_is_refused() {
    let store = open_store();
    let booking = store.booking();
    booking.confirm_booking(&maria_request()).unwrap();

    let second = BookingRequest {
        client_name: "Joana".to_string(),
        ..maria_request()
    };
    let err = booking.confirm_booking(&second).unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable(ref id) if id == &ana_ten_am()));
    assert_eq!(err.code(), "slot_unavailable");
    assert_eq!(appointment_count(&store), 1);

    let err = booking.select_slot(&ana_ten_am(), &ana()).unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable(_)));
}

#[test]
fn slot_closed_at_generation_cannot_be_booked() {
    let store = SalonStore::open(Catalog::salon_default(), SchedulingConfig::default()).unwrap();
    store
        .generate_slots_with(monday(), &mut FixedAvailability::closed([ana_ten_am()]))
        .unwrap();

    let err = store.booking().confirm_booking(&maria_request()).unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable(_)));
    assert_eq!(appointment_count(&store), 0);
}

#[test]
fn unknown_slot_is_not_found() {
    let store = open_store();
    let request = BookingRequest {
        slot_id: SlotId::from_raw("1-2030-01-01-10:00"),
        ..maria_request()
    };
    let err = store.booking().confirm_booking(&request).unwrap_err();
    assert!(matches!(err, BookingError::SlotNotFound(_)));
}

#[test]
fn cancelling_reopens_slot_and_status_stays_cancelled() {
    let store = open_store();
    let booking = store.booking();
    let appointment = booking.confirm_booking(&maria_request()).unwrap();

    let change = booking
        .change_status(appointment.id, AppointmentStatus::Cancelled)
        .unwrap();
    assert!(change.changed);
    assert_eq!(change.notice(), Notice::AppointmentCancelled);
    assert!(slot(&store, &ana_ten_am()).is_available);

    let err = booking
        .change_status(appointment.id, AppointmentStatus::Completed)
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::InvalidTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Completed
        }
    ));
    let stored = booking.get_appointment(appointment.id).unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
}

#[test]
fn completing_keeps_slot_closed() {
    let store = open_store();
    let booking = store.booking();
    let appointment = booking.confirm_booking(&maria_request()).unwrap();

    let change = booking
        .change_status(appointment.id, AppointmentStatus::Completed)
        .unwrap();
    assert_eq!(change.notice(), Notice::AppointmentCompleted);
    assert!(!slot(&store, &ana_ten_am()).is_available);

    let err = booking
        .change_status(appointment.id, AppointmentStatus::Cancelled)
        .unwrap_err();
    assert_eq!(err.code(), "invalid_transition");
    assert!(!slot(&store, &ana_ten_am()).is_available);
}

#[test]
fn repeating_the_same_status_change_is_idempotent() {
    let store = open_store();
    let booking = store.booking();
    let appointment = booking.confirm_booking(&maria_request()).unwrap();

    let first = booking
        .change_status(appointment.id, AppointmentStatus::Cancelled)
        .unwrap();
    let after_first = (
        all_slots(&store),
        booking
            .list_appointments(&AppointmentListQuery::default())
            .unwrap(),
    );

    let second = booking
        .change_status(appointment.id, AppointmentStatus::Cancelled)
        .unwrap();
    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(second.status, AppointmentStatus::Cancelled);

    let after_second = (
        all_slots(&store),
        booking
            .list_appointments(&AppointmentListQuery::default())
            .unwrap(),
    );
    assert_eq!(after_first, after_second);
}

#[test]
fn unknown_appointment_status_change_leaves_registry_untouched() {
    let store = open_store();
    let booking = store.booking();
    booking.confirm_booking(&maria_request()).unwrap();
    let before = booking
        .list_appointments(&AppointmentListQuery::default())
        .unwrap();

    let missing = Uuid::new_v4();
    let err = booking
        .change_status(missing, AppointmentStatus::Completed)
        .unwrap_err();
    assert!(matches!(err, BookingError::AppointmentNotFound(id) if id == missing));

    let after = booking
        .list_appointments(&AppointmentListQuery::default())
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn scheduled_is_not_a_valid_target_status() {
    let store = open_store();
    let booking = store.booking();
    let appointment = booking.confirm_booking(&maria_request()).unwrap();
    let err = booking
        .change_status(appointment.id, AppointmentStatus::Scheduled)
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidTargetStatus(_)));
}

#[test]
fn book_cancel_rebook_produces_two_records_and_closed_slot() {
    let store = open_store();
    let booking = store.booking();

    let first = booking.confirm_booking(&maria_request()).unwrap();
    booking
        .change_status(first.id, AppointmentStatus::Cancelled)
        .unwrap();
    let second = booking
        .confirm_booking(&BookingRequest {
            client_name: "Joana".to_string(),
            client_email: Some("joana@email.com".to_string()),
            ..maria_request()
        })
        .unwrap();

    let records = booking
        .list_appointments(&AppointmentListQuery::default())
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, first.id);
    assert_eq!(records[0].status, AppointmentStatus::Cancelled);
    assert_eq!(records[1].id, second.id);
    assert_eq!(records[1].status, AppointmentStatus::Scheduled);
    assert!(!slot(&store, &ana_ten_am()).is_available);
}

#[test]
fn optional_fields_are_trimmed_or_dropped() {
    let store = open_store();
    let appointment = store
        .booking()
        .confirm_booking(&BookingRequest {
            client_email: Some("   ".to_string()),
            notes: Some("  Prefere tesoura ".to_string()),
            ..maria_request()
        })
        .unwrap();
    assert_eq!(appointment.client_email, None);
    assert_eq!(appointment.notes.as_deref(), Some("Prefere tesoura"));
}

#[test]
fn regenerating_keeps_booked_slots_closed() {
    let store = open_store();
    store.booking().confirm_booking(&maria_request()).unwrap();

    let summary = store
        .generate_slots_with(monday(), &mut AlwaysAvailable)
        .unwrap();
    assert_eq!(summary.inserted, 0);
    assert!(!slot(&store, &ana_ten_am()).is_available);
}

#[test]
fn demo_seed_holds_its_slot_and_runs_once() {
    let store = open_store();
    assert_eq!(store.seed_demo_appointments(monday()).unwrap(), 1);
    assert_eq!(store.seed_demo_appointments(monday()).unwrap(), 0);

    assert!(!slot(&store, &ana_ten_am()).is_available);
    let err = store.booking().confirm_booking(&maria_request()).unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable(_)));
}

#[test]
fn demo_seed_on_a_pre_closed_slot_keeps_it_closed() {
    let store = SalonStore::open(Catalog::salon_default(), SchedulingConfig::default()).unwrap();
    store
        .generate_slots_with(monday(), &mut FixedAvailability::closed([ana_ten_am()]))
        .unwrap();

    assert_eq!(store.seed_demo_appointments(monday()).unwrap(), 1);
    assert!(!slot(&store, &ana_ten_am()).is_available);
    let open_slots = all_slots(&store)
        .into_iter()
        .filter(|slot| slot.is_available)
        .count();
    assert_eq!(open_slots, all_slots(&store).len() - 1);
}

#[test]
fn demo_seed_before_generation_is_held_once_slots_exist() {
    let store = SalonStore::open(Catalog::salon_default(), SchedulingConfig::default()).unwrap();
    assert_eq!(store.seed_demo_appointments(monday()).unwrap(), 1);
    assert!(all_slots(&store).is_empty());

    let summary = store
        .generate_slots_with(monday(), &mut AlwaysAvailable)
        .unwrap();
    assert_eq!(summary.reconciled, 1);
    assert!(!slot(&store, &ana_ten_am()).is_available);
}

#[test]
fn seeded_generation_is_reproducible_across_stores() {
    let config = SchedulingConfig {
        seed: Some(2026),
        ..SchedulingConfig::default()
    };
    let first = SalonStore::open(Catalog::salon_default(), config.clone()).unwrap();
    let second = SalonStore::open(Catalog::salon_default(), config).unwrap();
    first.generate_slots(monday()).unwrap();
    second.generate_slots(monday()).unwrap();

    assert_eq!(all_slots(&first), all_slots(&second));
}
