//! Shared types, errors, and configuration for the Atelier warehouse.
//!
//! This crate provides common types used across all other crates:
//! - Date keys for the warehouse date dimension
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::DateKey;
