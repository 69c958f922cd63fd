//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `salon_core` wiring.
//! - Print the day schedule the UI would open with.

use chrono::Local;
use salon_core::{Catalog, SalonConfig, SalonStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("salon_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("salon_core version={}", salon_core::core_version());

    let config = SalonConfig::from_env()?;
    salon_core::init_from_config(&config.logging)?;

    let store = SalonStore::open(Catalog::salon_default(), config.scheduling)?;
    let today = Local::now().date_naive();
    let summary = store.generate_slots(today)?;
    let seeded = store.seed_demo_appointments(today)?;
    println!(
        "slots generated={} inserted={} demo_appointments={}",
        summary.generated, summary.inserted, seeded
    );

    for column in store.schedule().day_schedule(today)? {
        println!(
            "{} ({}) open={} booked={}",
            column.professional.name,
            column.specialty_names.join(", "),
            column.available_slots.len(),
            column.appointments.len()
        );
        for appointment in &column.appointments {
            println!(
                "  {}-{} {} [{}]",
                appointment.start_time.format("%H:%M"),
                appointment.end_time.format("%H:%M"),
                appointment.client_name,
                appointment.status.as_str()
            );
        }
    }
    Ok(())
}
