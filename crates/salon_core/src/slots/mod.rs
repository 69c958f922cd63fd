//! Slot generation.
//!
//! # Responsibility
//! - Materialize every bookable slot of the horizon for every professional.
//! - Keep availability seeding behind an injectable source.
//!
//! # Invariants
//! - Output is a finite, ordered `Vec`; generation has no side effects.
//! - Same catalog, start date, config and seed produce identical output.

pub mod availability;
pub mod generator;
