//! Initial availability sources for generated slots.

use crate::model::slot::SlotId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// Decides whether a freshly generated slot starts open.
///
/// Called once per slot, in generation order.
pub trait AvailabilitySource {
    fn is_open(&mut self, slot_id: &SlotId) -> bool;
}

/// Pseudo-random draws with a fixed open probability.
pub struct SeededAvailability {
    rng: StdRng,
    open_probability: f64,
}

impl SeededAvailability {
    /// Reproducible draws: the same `seed` yields the same sequence.
    ///
    /// Probabilities outside `0.0..=1.0` are clamped; NaN closes every slot.
    pub fn new(seed: u64, open_probability: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            open_probability: bounded_probability(open_probability),
        }
    }

    /// Draws seeded from OS entropy.
    pub fn from_entropy(open_probability: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            open_probability: bounded_probability(open_probability),
        }
    }
}

fn bounded_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl AvailabilitySource for SeededAvailability {
    fn is_open(&mut self, _slot_id: &SlotId) -> bool {
        self.rng.gen_bool(self.open_probability)
    }
}

/// Every slot starts open.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl AvailabilitySource for AlwaysAvailable {
    fn is_open(&mut self, _slot_id: &SlotId) -> bool {
        true
    }
}

/// Fixture source: listed slots start closed, all others open.
#[derive(Debug, Clone, Default)]
pub struct FixedAvailability {
    closed: BTreeSet<SlotId>,
}

impl FixedAvailability {
    pub fn closed(slot_ids: impl IntoIterator<Item = SlotId>) -> Self {
        Self {
            closed: slot_ids.into_iter().collect(),
        }
    }
}

impl AvailabilitySource for FixedAvailability {
    fn is_open(&mut self, slot_id: &SlotId) -> bool {
        !self.closed.contains(slot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{AvailabilitySource, FixedAvailability, SeededAvailability};
    use crate::model::slot::SlotId;

    #[test]
    fn same_seed_repeats_draws() {
        let id = SlotId::from_raw("1-2026-01-05-09:00");
        let mut first = SeededAvailability::new(7, 0.7);
        let mut second = SeededAvailability::new(7, 0.7);
        let a = (0..64).map(|_| first.is_open(&id)).collect::<Vec<_>>();
        let b = (0..64).map(|_| second.is_open(&id)).collect::<Vec<_>>();
        assert_eq!(a, b);
    }

    #[test]
    fn probability_bounds_are_absolute() {
        let id = SlotId::from_raw("1-2026-01-05-09:00");
        let mut never = SeededAvailability::new(1, 0.0);
        let mut always = SeededAvailability::new(1, 1.0);
        assert!((0..32).all(|_| !never.is_open(&id)));
        assert!((0..32).all(|_| always.is_open(&id)));
    }

    #[test]
    fn out_of_range_probabilities_never_panic() {
        let id = SlotId::from_raw("1-2026-01-05-09:00");
        let mut nan = SeededAvailability::new(1, f64::NAN);
        let mut above = SeededAvailability::new(1, f64::INFINITY);
        let mut below = SeededAvailability::from_entropy(-0.5);
        assert!((0..32).all(|_| !nan.is_open(&id)));
        assert!((0..32).all(|_| above.is_open(&id)));
        assert!((0..32).all(|_| !below.is_open(&id)));
    }

    #[test]
    fn fixed_source_closes_only_listed_ids() {
        let closed = SlotId::from_raw("2-2026-01-05-10:00");
        let mut source = FixedAvailability::closed([closed.clone()]);
        assert!(!source.is_open(&closed));
        assert!(source.is_open(&SlotId::from_raw("2-2026-01-05-11:00")));
    }
}
