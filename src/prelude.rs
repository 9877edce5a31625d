//! Prelude module for datepicker_engine.
//!
//! Re-exports the derive macros from derive_more used across the crate.

pub use derive_more::Display;
