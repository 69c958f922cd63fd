//! FFI surface for the salon booking UI.

pub mod api;
