//! Warehouse ETL orchestrator.
//!
//! Runs the fixed pipeline: extend the date dimension, synchronize the
//! SCD2 dimensions, then load facts. Facts are never loaded before the
//! dimensions have been brought up to date within the same run. A tokio
//! mutex guarantees at most one run in flight; an overlapping trigger is
//! reported as skipped rather than queued, since the next tick covers the
//! same data.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{error, info};

use atelier_core::run::{EtlStep, RunReport, RunState, RunTrigger, StepReport};
use atelier_db::repositories::{DimensionError, FactError, SyncOutcome};
use atelier_db::{DateDimensionRepository, DimensionRepository, FactRepository, SourceRepository};
use atelier_shared::{AppError, DateKey, config::EtlConfig};

fn dimension_error(e: &DimensionError) -> AppError {
    match e {
        DimensionError::DuplicateCurrent { .. } => AppError::DataIntegrity(e.to_string()),
        DimensionError::Database(_) => AppError::Database(e.to_string()),
    }
}

fn fact_error(e: &FactError) -> AppError {
    match e {
        FactError::Dimension(inner) => dimension_error(inner),
        FactError::Source(_) | FactError::Database(_) => AppError::Database(e.to_string()),
    }
}

/// Collapses a dimension sync outcome into step counts: versions written
/// count as processed, unchanged records as skipped.
#[must_use]
pub const fn outcome_as_step(outcome: SyncOutcome) -> StepReport {
    StepReport {
        processed: outcome.inserted + outcome.superseded,
        skipped: outcome.unchanged,
        failed: outcome.failed,
    }
}

/// The warehouse ETL pipeline.
///
/// Cloneable handles are not offered; callers share it behind an `Arc` so
/// the run lock is global to the process.
#[derive(Debug)]
pub struct WarehouseEtl {
    config: EtlConfig,
    date_dim: DateDimensionRepository,
    dimensions: DimensionRepository,
    facts: FactRepository,
    source: SourceRepository,
    run_lock: Mutex<()>,
}

impl WarehouseEtl {
    /// Creates the pipeline over one database connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: EtlConfig) -> Self {
        Self {
            date_dim: DateDimensionRepository::new(db.clone()),
            dimensions: DimensionRepository::new(db.clone()),
            facts: FactRepository::new(db.clone()),
            source: SourceRepository::new(db),
            config,
            run_lock: Mutex::new(()),
        }
    }

    /// Runs the full daily pipeline.
    ///
    /// Never returns an error: every failure mode is folded into the
    /// report so the scheduler loop cannot die.
    pub async fn run_daily(&self) -> RunReport {
        let Ok(_guard) = self.run_lock.try_lock() else {
            info!(
                trigger = "daily",
                code = AppError::RunInProgress.error_code(),
                "run already in progress, skipping trigger"
            );
            return RunReport::skipped(RunTrigger::Daily);
        };

        let mut report = RunReport::begin(RunTrigger::Daily);
        info!(run_id = %report.run_id, trigger = "daily", "warehouse run started");

        let mut state = RunState::Idle.advance();
        debug_assert_eq!(state, RunState::RunningDateDim);

        let today = Utc::now().date_naive();
        let horizon = today + Duration::days(self.config.date_horizon_days);
        match self.date_dim.populate_range(today, horizon).await {
            Ok(inserted) => {
                report.date_dim_rows = inserted;
                state = state.advance();
            }
            Err(e) => {
                return Self::finish_failed(report, state, &AppError::Database(e.to_string()));
            }
        }

        match self.sync_dimensions().await {
            Ok(outcome) => {
                report.dimensions = outcome_as_step(outcome);
                state = state.advance();
            }
            Err(e) => {
                return Self::finish_failed(report, state, &e);
            }
        }

        match self.load_facts(DateKey::from_date(today)).await {
            Ok(step) => {
                report.facts = step;
                state = state.advance();
            }
            Err(e) => {
                return Self::finish_failed(report, state, &e);
            }
        }

        debug_assert_eq!(state, RunState::Completed);
        Self::finish_completed(report)
    }

    /// Runs the fact-only hourly refresh.
    ///
    /// Dimensions are left as the last daily run wrote them; entities
    /// without a current dimension row are skipped, not failed.
    pub async fn run_hourly_facts(&self) -> RunReport {
        let Ok(_guard) = self.run_lock.try_lock() else {
            info!(
                trigger = "hourly_facts",
                code = AppError::RunInProgress.error_code(),
                "run already in progress, skipping trigger"
            );
            return RunReport::skipped(RunTrigger::HourlyFacts);
        };

        let mut report = RunReport::begin(RunTrigger::HourlyFacts);
        info!(run_id = %report.run_id, trigger = "hourly_facts", "fact refresh started");

        let today = Utc::now().date_naive();
        match self.load_facts(DateKey::from_date(today)).await {
            Ok(step) => {
                report.facts = step;
                Self::finish_completed(report)
            }
            Err(e) => Self::finish_failed(report, RunState::RunningFacts, &e),
        }
    }

    async fn sync_dimensions(&self) -> Result<SyncOutcome, AppError> {
        let now = Utc::now();
        let mut outcome = SyncOutcome::default();

        let users = self
            .source
            .all_users()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        outcome.absorb(
            self.dimensions
                .sync_users(&users, now)
                .await
                .map_err(|e| dimension_error(&e))?,
        );

        let projects = self
            .source
            .all_projects()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        outcome.absorb(
            self.dimensions
                .sync_projects(&projects, now)
                .await
                .map_err(|e| dimension_error(&e))?,
        );

        let products = self
            .source
            .all_products()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        outcome.absorb(
            self.dimensions
                .sync_products(&products, now)
                .await
                .map_err(|e| dimension_error(&e))?,
        );

        Ok(outcome)
    }

    async fn load_facts(&self, date_key: DateKey) -> Result<StepReport, AppError> {
        let now = Utc::now();
        let mut step = StepReport::default();

        step.absorb(
            self.facts
                .load_project_metrics(date_key, now)
                .await
                .map_err(|e| fact_error(&e))?,
        );
        step.absorb(
            self.facts
                .load_product_usage(date_key, now)
                .await
                .map_err(|e| fact_error(&e))?,
        );
        step.absorb(
            self.facts
                .load_project_daily(date_key, now)
                .await
                .map_err(|e| fact_error(&e))?,
        );

        Ok(step)
    }

    fn finish_completed(mut report: RunReport) -> RunReport {
        report.finished_at = Utc::now();
        if report.is_degraded() {
            info!(
                run_id = %report.run_id,
                dim_failed = report.dimensions.failed,
                fact_failed = report.facts.failed,
                "warehouse run completed with per-record failures"
            );
        } else {
            info!(
                run_id = %report.run_id,
                date_dim_rows = report.date_dim_rows,
                dims_processed = report.dimensions.processed,
                facts_processed = report.facts.processed,
                "warehouse run completed"
            );
        }
        report
    }

    fn finish_failed(mut report: RunReport, state: RunState, error: &AppError) -> RunReport {
        let step = state.current_step().unwrap_or(EtlStep::Facts);
        report.record_failure(step, &error.to_string());
        report.finished_at = Utc::now();
        error!(
            run_id = %report.run_id,
            step = %step,
            code = error.error_code(),
            recoverable = error.is_recoverable(),
            error = %error,
            "warehouse run failed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_as_step_mapping() {
        let outcome = SyncOutcome {
            processed: 10,
            inserted: 3,
            superseded: 2,
            unchanged: 4,
            failed: 1,
        };
        let step = outcome_as_step(outcome);
        assert_eq!(step.processed, 5);
        assert_eq!(step.skipped, 4);
        assert_eq!(step.failed, 1);
    }

    #[test]
    fn test_duplicate_current_is_a_data_integrity_error() {
        let e = DimensionError::DuplicateCurrent {
            entity: "dim_users",
            natural_key: 7,
        };
        let mapped = dimension_error(&e);
        assert_eq!(mapped.error_code(), "DATA_INTEGRITY");
        assert!(!mapped.is_recoverable());
    }

    #[test]
    fn test_fact_errors_wrap_their_dimension_cause() {
        let e = FactError::Dimension(DimensionError::DuplicateCurrent {
            entity: "dim_projects",
            natural_key: 3,
        });
        assert_eq!(fact_error(&e).error_code(), "DATA_INTEGRITY");
    }
}
