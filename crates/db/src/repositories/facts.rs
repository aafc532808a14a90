//! Fact loader repository.
//!
//! Computes current-snapshot measures per entity and appends fact rows
//! keyed to the dimension surrogate keys that are current at load time.
//! Fact rows are never updated: repeated hourly runs accumulate a time
//! series of snapshots. An entity whose dimension rows are not yet current
//! is skipped and reported, never fatal; the next run picks it up.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::{debug, warn};

use atelier_core::metrics::completion_percent;
use atelier_core::run::StepReport;
use atelier_shared::DateKey;

use crate::entities::{fact_product_usage, fact_project_daily, fact_project_metrics, products};
use crate::repositories::dimension::{DimensionError, DimensionRepository};
use crate::repositories::source::{SourceError, SourceRepository};

/// Error types for fact loads.
#[derive(Debug, thiserror::Error)]
pub enum FactError {
    /// Dimension lookup failed.
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    /// Source read failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Fact repository: the only writer of the fact tables.
#[derive(Debug, Clone)]
pub struct FactRepository {
    db: DatabaseConnection,
    source: SourceRepository,
    dimensions: DimensionRepository,
}

impl FactRepository {
    /// Creates a new fact repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            source: SourceRepository::new(db.clone()),
            dimensions: DimensionRepository::new(db.clone()),
            db,
        }
    }

    /// Loads one `fact_project_metrics` snapshot row per project.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures escape; per-entity problems are
    /// counted in the report.
    pub async fn load_project_metrics(
        &self,
        date_key: DateKey,
        now: DateTime<Utc>,
    ) -> Result<StepReport, FactError> {
        let mut report = StepReport::default();

        for project in self.source.all_projects().await? {
            let project_key = self.dimensions.current_project_key(project.id).await?;
            let user_key = self.dimensions.current_user_key(project.user_id).await?;

            let (Some(project_key), Some(user_key)) = (project_key, user_key) else {
                debug!(
                    project_id = project.id,
                    "skipping metrics load, dimension rows not yet current"
                );
                report.skipped += 1;
                continue;
            };

            let linked = self.source.products_for_project(project.id).await?;

            let row = fact_project_metrics::ActiveModel {
                date_key: Set(date_key.value()),
                project_key: Set(project_key),
                user_key: Set(user_key),
                total_products: Set(i32::try_from(linked.len()).unwrap_or(i32::MAX)),
                total_value: Set(linked_product_value(&linked)),
                completion_percentage: Set(completion_percent(
                    project.tasks_completed,
                    project.tasks_pending,
                )),
                loaded_at: Set(now.into()),
                ..Default::default()
            };

            match row.insert(&self.db).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    warn!(project_id = project.id, error = %e, "project metrics insert failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Loads one `fact_product_usage` snapshot row per product.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures escape; per-entity problems are
    /// counted in the report.
    pub async fn load_product_usage(
        &self,
        date_key: DateKey,
        now: DateTime<Utc>,
    ) -> Result<StepReport, FactError> {
        let mut report = StepReport::default();
        let projects = self.source.all_projects().await?;

        for product in self.source.all_products().await? {
            let product_key = self.dimensions.current_product_key(product.id).await?;
            let project_key = self.dimensions.current_project_key(product.project_id).await?;

            let (Some(product_key), Some(project_key)) = (product_key, project_key) else {
                debug!(
                    product_id = product.id,
                    "skipping usage load, dimension rows not yet current"
                );
                report.skipped += 1;
                continue;
            };

            // Efficiency tracks how far along the owning project is
            let efficiency = projects
                .iter()
                .find(|p| p.id == product.project_id)
                .map_or(Decimal::ZERO, |p| {
                    completion_percent(p.tasks_completed, p.tasks_pending)
                });

            let total_cost = (product.price * Decimal::from(product.quantity)).round_dp(2);

            let row = fact_product_usage::ActiveModel {
                date_key: Set(date_key.value()),
                product_key: Set(product_key),
                project_key: Set(project_key),
                quantity_used: Set(product.quantity),
                total_cost: Set(total_cost),
                efficiency_score: Set(efficiency),
                loaded_at: Set(now.into()),
                ..Default::default()
            };

            match row.insert(&self.db).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    warn!(product_id = product.id, error = %e, "product usage insert failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Loads one `fact_project_daily` snapshot row per project.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures escape; per-entity problems are
    /// counted in the report.
    pub async fn load_project_daily(
        &self,
        date_key: DateKey,
        now: DateTime<Utc>,
    ) -> Result<StepReport, FactError> {
        let mut report = StepReport::default();

        for project in self.source.all_projects().await? {
            let project_key = self.dimensions.current_project_key(project.id).await?;
            let user_key = self.dimensions.current_user_key(project.user_id).await?;

            let (Some(project_key), Some(user_key)) = (project_key, user_key) else {
                debug!(
                    project_id = project.id,
                    "skipping daily snapshot, dimension rows not yet current"
                );
                report.skipped += 1;
                continue;
            };

            let linked = self.source.products_for_project(project.id).await?;
            let budget_utilized: Decimal = linked
                .iter()
                .map(|p| p.price * Decimal::from(p.quantity))
                .sum();

            let row = fact_project_daily::ActiveModel {
                date_key: Set(date_key.value()),
                project_key: Set(project_key),
                user_key: Set(user_key),
                products_count: Set(i32::try_from(linked.len()).unwrap_or(i32::MAX)),
                total_value: Set(linked_product_value(&linked)),
                tasks_completed: Set(project.tasks_completed),
                tasks_pending: Set(project.tasks_pending),
                budget_utilized: Set(budget_utilized.round_dp(2)),
                snapshot_time: Set(now.into()),
                ..Default::default()
            };

            match row.insert(&self.db).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    warn!(project_id = project.id, error = %e, "daily snapshot insert failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Sums linked product value for one project snapshot.
///
/// Pure helper kept separate so measure arithmetic is testable without
/// database access.
#[must_use]
pub fn linked_product_value(linked: &[products::Model]) -> Decimal {
    linked.iter().map(|p| p.price).sum::<Decimal>().round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal, quantity: i32) -> products::Model {
        products::Model {
            id: 1,
            project_id: 1,
            name: "Solar Panels".to_string(),
            category: "Renewable Energy".to_string(),
            vendor: "SolarTech".to_string(),
            price,
            quantity,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_linked_product_value_sums_prices() {
        let linked = vec![product(dec!(750.00), 10), product(dec!(233.33), 15)];
        assert_eq!(linked_product_value(&linked), dec!(983.33));
    }

    #[test]
    fn test_linked_product_value_empty() {
        assert_eq!(linked_product_value(&[]), Decimal::ZERO);
    }
}
