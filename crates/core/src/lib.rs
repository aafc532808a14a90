//! Core warehouse logic for Atelier.
//!
//! This crate contains pure warehouse logic with ZERO web or database
//! dependencies. All calendar derivation, SCD2 change detection, metric
//! arithmetic, and run bookkeeping live here.
//!
//! # Modules
//!
//! - `calendar` - Date dimension attribute derivation
//! - `scd` - Type-2 slowly changing dimension change detection
//! - `metrics` - Fact measure arithmetic (decimal, no floats)
//! - `run` - ETL run state machine and reports

pub mod calendar;
pub mod metrics;
pub mod run;
pub mod scd;
