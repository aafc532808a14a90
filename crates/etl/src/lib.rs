//! Warehouse ETL orchestration for Atelier.
//!
//! The orchestrator sequences the three-step pipeline (date dimension,
//! dimension synchronization, fact loads) and guarantees at most one run
//! in flight; the scheduler drives it on the daily and hourly cadences.

pub mod orchestrator;
pub mod scheduler;

pub use orchestrator::WarehouseEtl;
pub use scheduler::EtlScheduler;
