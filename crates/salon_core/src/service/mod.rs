//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into booking use-cases.
//! - Keep FFI/CLI callers decoupled from storage details.

pub mod booking_service;
pub mod schedule_service;
