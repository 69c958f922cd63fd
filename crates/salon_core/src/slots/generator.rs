//! Horizon slot generator.

use super::availability::AvailabilitySource;
use crate::catalog::Catalog;
use crate::config::SchedulingConfig;
use crate::model::slot::{SlotId, TimeSlot};
use chrono::{Datelike, Duration, NaiveDate};

/// Produces slots for `horizon_days` from a start date.
///
/// Order: day ascending, then professionals in catalog order, then start time.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    config: SchedulingConfig,
}

impl SlotGenerator {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Days of the horizon that carry slots (closed weekday skipped).
    pub fn open_days(&self, start_date: NaiveDate) -> Vec<NaiveDate> {
        start_date
            .iter_days()
            .take(self.config.horizon_days as usize)
            .filter(|date| Some(date.weekday()) != self.config.closed_weekday)
            .collect()
    }

    /// Generates the full slot set for the horizon starting at `start_date`.
    pub fn generate(
        &self,
        catalog: &Catalog,
        start_date: NaiveDate,
        availability: &mut dyn AvailabilitySource,
    ) -> Vec<TimeSlot> {
        let starts = self.config.slot_starts();
        let length = Duration::minutes(i64::from(self.config.slot_minutes));
        let open_days = self.open_days(start_date);
        let mut slots =
            Vec::with_capacity(open_days.len() * catalog.professionals().len() * starts.len());

        for date in open_days {
            for professional in catalog.professionals() {
                for start in &starts {
                    let id = SlotId::derive(&professional.id, date, *start);
                    let is_available = availability.is_open(&id);
                    slots.push(TimeSlot {
                        id,
                        professional_id: professional.id.clone(),
                        date,
                        start_time: *start,
                        end_time: *start + length,
                        is_available,
                    });
                }
            }
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::SlotGenerator;
    use crate::catalog::Catalog;
    use crate::config::SchedulingConfig;
    use crate::slots::availability::{AlwaysAvailable, SeededAvailability};
    use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
    use std::collections::{BTreeMap, HashSet};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
    }

    #[test]
    fn nine_slots_per_professional_per_open_day_and_none_on_sunday() {
        let catalog = Catalog::salon_default();
        let generator = SlotGenerator::new(SchedulingConfig::default());
        let slots = generator.generate(&catalog, monday(), &mut AlwaysAvailable);

        let mut per_key = BTreeMap::new();
        for slot in &slots {
            assert_ne!(slot.date.weekday(), Weekday::Sun);
            *per_key
                .entry((slot.professional_id.clone(), slot.date))
                .or_insert(0) += 1;
        }
        assert!(per_key.values().all(|count| *count == 9));

        let sundays = monday()
            .iter_days()
            .take(30)
            .filter(|date| date.weekday() == Weekday::Sun)
            .count();
        assert_eq!(slots.len(), (30 - sundays) * 3 * 9);
    }

    #[test]
    fn slot_ranges_and_ids_are_consistent() {
        let catalog = Catalog::salon_default();
        let generator = SlotGenerator::new(SchedulingConfig::default());
        let slots = generator.generate(&catalog, monday(), &mut AlwaysAvailable);

        let first = &slots[0];
        assert_eq!(first.id.as_str(), "1-2026-03-02-09:00");
        assert_eq!(first.start_time, NaiveTime::from_hms_opt(9, 0, 0).expect("time"));
        assert_eq!(first.end_time, NaiveTime::from_hms_opt(10, 0, 0).expect("time"));

        let unique = slots.iter().map(|slot| slot.id.clone()).collect::<HashSet<_>>();
        assert_eq!(unique.len(), slots.len());
        assert!(slots.iter().all(|slot| slot.validate().is_ok()));
    }

    #[test]
    fn same_seed_reproduces_availability() {
        let catalog = Catalog::salon_default();
        let generator = SlotGenerator::new(SchedulingConfig::default());
        let first = generator.generate(&catalog, monday(), &mut SeededAvailability::new(11, 0.7));
        let second = generator.generate(&catalog, monday(), &mut SeededAvailability::new(11, 0.7));
        assert_eq!(first, second);

        let open = first.iter().filter(|slot| slot.is_available).count();
        assert!(open > 0 && open < first.len());
    }

    #[test]
    fn closed_weekday_is_configurable() {
        let catalog = Catalog::salon_default();
        let generator = SlotGenerator::new(SchedulingConfig {
            closed_weekday: Some(Weekday::Mon),
            horizon_days: 7,
            ..SchedulingConfig::default()
        });
        let slots = generator.generate(&catalog, monday(), &mut AlwaysAvailable);
        assert!(slots.iter().all(|slot| slot.date.weekday() != Weekday::Mon));
        assert_eq!(slots.len(), 6 * 3 * 9);
    }
}
