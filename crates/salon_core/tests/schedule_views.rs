use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use salon_core::{
    AlwaysAvailable, AppointmentStatus, BookingError, BookingRequest, Catalog, ProfessionalId,
    SalonStore, SchedulingConfig, ServiceId, SlotId,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

fn open_store() -> SalonStore {
    let store = SalonStore::open(Catalog::salon_default(), SchedulingConfig::default()).unwrap();
    store
        .generate_slots_with(monday(), &mut AlwaysAvailable)
        .unwrap();
    store
}

fn book(store: &SalonStore, professional: &str, service: &str, date: NaiveDate, hour: u32) {
    let professional_id = ProfessionalId::new(professional);
    store
        .booking()
        .confirm_booking(&BookingRequest {
            slot_id: SlotId::derive(&professional_id, date, at(hour)),
            professional_id,
            service_id: ServiceId::new(service),
            client_name: format!("Cliente {hour}"),
            client_phone: "11988887777".to_string(),
            client_email: None,
            notes: None,
        })
        .unwrap();
}

#[test]
fn month_overview_counts_open_slots_and_appointments_per_day() {
    let store = open_store();
    book(&store, "1", "1", monday(), 10);
    book(&store, "3", "5", monday(), 14);

    let days = store
        .schedule()
        .month_overview(2026, 3, monday())
        .unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

    let first_monday = &days[1];
    assert!(first_monday.is_today);
    assert_eq!(first_monday.appointment_count, 2);
    assert_eq!(first_monday.available_slot_count, 3 * 9 - 2);

    // The horizon starts on the 2nd, so the 1st has no slots.
    assert_eq!(days[0].available_slot_count, 0);
    for day in &days {
        if day.date.weekday() == Weekday::Sun {
            assert_eq!(day.available_slot_count, 0);
        }
    }
    assert_eq!(days.iter().filter(|day| day.is_today).count(), 1);
}

#[test]
fn month_overview_counts_cancelled_appointments_too() {
    let store = open_store();
    book(&store, "2", "2", monday(), 9);
    let appointment = store.schedule().agenda().unwrap().remove(0);
    store
        .booking()
        .change_status(appointment.id, AppointmentStatus::Cancelled)
        .unwrap();

    let days = store
        .schedule()
        .month_overview(2026, 3, monday())
        .unwrap();
    assert_eq!(days[1].appointment_count, 1);
    assert_eq!(days[1].available_slot_count, 27);
}

#[test]
fn month_overview_rejects_invalid_month() {
    let store = open_store();
    let err = store
        .schedule()
        .month_overview(2026, 13, monday())
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidMonth { month: 13, .. }));
}

#[test]
fn december_overview_ends_on_the_31st() {
    let store = open_store();
    let days = store
        .schedule()
        .month_overview(2026, 12, monday())
        .unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(
        days.last().unwrap().date,
        NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
    );
}

#[test]
fn day_schedule_groups_by_professional_in_catalog_order() {
    let store = open_store();
    book(&store, "1", "3", monday(), 15);
    book(&store, "1", "1", monday(), 9);

    let columns = store.schedule().day_schedule(monday()).unwrap();
    let names = columns
        .iter()
        .map(|column| column.professional.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Ana Silva", "Carlos Santos", "Maria Oliveira"]);

    let ana = &columns[0];
    assert_eq!(ana.specialty_names, vec!["Corte Feminino", "Coloração", "Escova"]);
    assert_eq!(ana.available_slots.len(), 7);
    assert!(ana
        .available_slots
        .windows(2)
        .all(|pair| pair[0].start_time < pair[1].start_time));
    let booked_times = ana
        .appointments
        .iter()
        .map(|appointment| appointment.start_time)
        .collect::<Vec<_>>();
    assert_eq!(booked_times, vec![at(9), at(15)]);

    assert_eq!(columns[1].available_slots.len(), 9);
    assert!(columns[1].appointments.is_empty());
}

#[test]
fn day_schedule_on_closed_day_has_no_slots() {
    let store = open_store();
    let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let columns = store.schedule().day_schedule(sunday).unwrap();
    assert_eq!(columns.len(), 3);
    assert!(columns.iter().all(|column| column.available_slots.is_empty()));
}

#[test]
fn agenda_is_chronological() {
    let store = open_store();
    let tuesday = monday().succ_opt().unwrap();
    book(&store, "2", "2", tuesday, 9);
    book(&store, "1", "1", monday(), 16);
    book(&store, "3", "6", monday(), 11);

    let agenda = store.schedule().agenda().unwrap();
    let order = agenda
        .iter()
        .map(|appointment| (appointment.date, appointment.start_time))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![(monday(), at(11)), (monday(), at(16)), (tuesday, at(9))]
    );
}
