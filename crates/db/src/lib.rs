//! Database layer with `SeaORM` entities and warehouse repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the operational source tables and the
//!   star-schema warehouse tables
//! - Repository abstractions for the ETL steps and analytics reads
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AnalyticsRepository, DateDimensionRepository, DimensionRepository, FactRepository,
    SourceRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
