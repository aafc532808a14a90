//! Date dimension repository.
//!
//! Population is idempotent: each day's key is derived from the date, and
//! days whose key already exists are skipped, so overlapping ranges on
//! every scheduled run insert no duplicates.

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::debug;

use atelier_core::calendar::{CalendarDay, date_range};

use crate::entities::dim_date;

/// Error types for date dimension operations.
#[derive(Debug, thiserror::Error)]
pub enum DateDimensionError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for the date dimension table.
#[derive(Debug, Clone)]
pub struct DateDimensionRepository {
    db: DatabaseConnection,
}

impl DateDimensionRepository {
    /// Creates a new date dimension repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ensures a date dimension row exists for every day in
    /// `[start, end]` inclusive. Returns the number of rows inserted.
    ///
    /// An inverted range is a no-op, not a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn populate_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, DateDimensionError> {
        let mut inserted = 0u64;

        for date in date_range(start, end) {
            let day = CalendarDay::from_date(date);

            let exists = dim_date::Entity::find_by_id(day.date_key.value())
                .one(&self.db)
                .await?
                .is_some();
            if exists {
                continue;
            }

            let row = dim_date::ActiveModel {
                date_key: Set(day.date_key.value()),
                date: Set(day.date),
                year: Set(day.year),
                quarter: Set(day.quarter),
                month: Set(day.month),
                month_name: Set(day.month_name.to_string()),
                day: Set(day.day),
                day_of_week: Set(day.day_of_week),
                day_name: Set(day.day_name.to_string()),
                is_weekend: Set(day.is_weekend),
                is_holiday: Set(day.is_holiday),
            };
            row.insert(&self.db).await?;
            inserted += 1;
        }

        debug!(%start, %end, inserted, "date dimension range populated");
        Ok(inserted)
    }

    /// Looks up one date dimension row by its `YYYYMMDD` key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_key(
        &self,
        date_key: i32,
    ) -> Result<Option<dim_date::Model>, DateDimensionError> {
        let result = dim_date::Entity::find_by_id(date_key).one(&self.db).await?;
        Ok(result)
    }
}
