//! Dimension repository applying Type-2 SCD versioning.
//!
//! For each operational record the repository compares the explicitly
//! tracked attributes against the current dimension row and either inserts
//! a first version, expires-and-inserts on change, or does nothing. The
//! expire and insert are two independent writes; if a crash lands between
//! them the next run finds no current row and re-inserts, and a partial
//! unique index on `(natural key) WHERE is_current` guarantees a duplicate
//! current row can never be committed.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::warn;

use atelier_core::scd::{self, ProductAttributes, ProjectAttributes, ScdAction, UserAttributes};

use crate::entities::{dim_products, dim_projects, dim_users, products, projects, users};

/// Error types for dimension operations.
#[derive(Debug, thiserror::Error)]
pub enum DimensionError {
    /// More than one current row exists for a natural key.
    #[error("Duplicate current rows in {entity} for natural key {natural_key}")]
    DuplicateCurrent {
        /// Dimension table name.
        entity: &'static str,
        /// The offending natural key.
        natural_key: i32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Aggregated result of one synchronization pass.
///
/// A failure on one record never aborts the pass; it is counted here and
/// the pass is reported as degraded when `failed > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Records examined.
    pub processed: u64,
    /// First versions inserted.
    pub inserted: u64,
    /// Versions expired and replaced.
    pub superseded: u64,
    /// Records with no attribute change.
    pub unchanged: u64,
    /// Records that failed in isolation.
    pub failed: u64,
}

impl SyncOutcome {
    fn record(&mut self, action: ScdAction) {
        self.processed += 1;
        match action {
            ScdAction::Insert => self.inserted += 1,
            ScdAction::Supersede => self.superseded += 1,
            ScdAction::Unchanged => self.unchanged += 1,
        }
    }

    fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// Merges another outcome into this one.
    pub fn absorb(&mut self, other: Self) {
        self.processed += other.processed;
        self.inserted += other.inserted;
        self.superseded += other.superseded;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
    }
}

// ============================================================================
// Tracked attribute extraction
// ============================================================================

/// Tracked attributes of an operational user record.
#[must_use]
pub fn user_attributes(record: &users::Model) -> UserAttributes {
    UserAttributes {
        username: record.username.clone(),
        email: record.email.clone(),
        role: record.role.clone(),
    }
}

/// Tracked attributes of a user dimension row.
#[must_use]
pub fn dim_user_attributes(row: &dim_users::Model) -> UserAttributes {
    UserAttributes {
        username: row.username.clone(),
        email: row.email.clone(),
        role: row.role.clone(),
    }
}

/// Tracked attributes of an operational project record.
#[must_use]
pub fn project_attributes(record: &projects::Model) -> ProjectAttributes {
    ProjectAttributes {
        name: record.name.clone(),
        status: record.status.clone(),
        project_type: record.project_type.clone(),
    }
}

/// Tracked attributes of a project dimension row.
#[must_use]
pub fn dim_project_attributes(row: &dim_projects::Model) -> ProjectAttributes {
    ProjectAttributes {
        name: row.name.clone(),
        status: row.status.clone(),
        project_type: row.project_type.clone(),
    }
}

/// Tracked attributes of an operational product record.
#[must_use]
pub fn product_attributes(record: &products::Model) -> ProductAttributes {
    ProductAttributes {
        name: record.name.clone(),
        category: record.category.clone(),
        vendor: record.vendor.clone(),
    }
}

/// Tracked attributes of a product dimension row.
#[must_use]
pub fn dim_product_attributes(row: &dim_products::Model) -> ProductAttributes {
    ProductAttributes {
        name: row.name.clone(),
        category: row.category.clone(),
        vendor: row.vendor.clone(),
    }
}

/// Dimension repository for SCD2 synchronization and current-key lookups.
#[derive(Debug, Clone)]
pub struct DimensionRepository {
    db: DatabaseConnection,
}

impl DimensionRepository {
    /// Creates a new dimension repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // User dimension
    // ========================================================================

    /// Synchronizes the user dimension against the given operational
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures escape; per-record failures are logged
    /// and counted in the outcome.
    pub async fn sync_users(
        &self,
        records: &[users::Model],
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, DimensionError> {
        let mut outcome = SyncOutcome::default();

        for record in records {
            match self.sync_one_user(record, now).await {
                Ok(action) => outcome.record(action),
                Err(e) => {
                    warn!(user_id = record.id, error = %e, "user dimension sync failed for record");
                    outcome.record_failure();
                }
            }
        }

        Ok(outcome)
    }

    async fn sync_one_user(
        &self,
        record: &users::Model,
        now: DateTime<Utc>,
    ) -> Result<ScdAction, DimensionError> {
        let current_rows = dim_users::Entity::find()
            .filter(dim_users::Column::UserId.eq(record.id))
            .filter(dim_users::Column::IsCurrent.eq(true))
            .all(&self.db)
            .await?;

        if current_rows.len() > 1 {
            return Err(DimensionError::DuplicateCurrent {
                entity: "dim_users",
                natural_key: record.id,
            });
        }

        let current = current_rows.first();
        let incoming = user_attributes(record);
        let action = scd::decide(current.map(dim_user_attributes).as_ref(), &incoming);

        match action {
            ScdAction::Unchanged => {}
            ScdAction::Supersede => {
                if let Some(existing) = current.cloned() {
                    let mut expire: dim_users::ActiveModel = existing.into();
                    expire.is_current = Set(false);
                    expire.valid_to = Set(Some(now.into()));
                    expire.update(&self.db).await?;
                }
                self.insert_user_version(record, now).await?;
            }
            ScdAction::Insert => self.insert_user_version(record, now).await?,
        }

        Ok(action)
    }

    async fn insert_user_version(
        &self,
        record: &users::Model,
        now: DateTime<Utc>,
    ) -> Result<(), DimensionError> {
        let row = dim_users::ActiveModel {
            user_id: Set(record.id),
            username: Set(record.username.clone()),
            email: Set(record.email.clone()),
            role: Set(record.role.clone()),
            is_current: Set(true),
            valid_from: Set(now.into()),
            valid_to: Set(None),
            ..Default::default()
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    /// Resolves the current surrogate key for a user natural key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current_user_key(&self, user_id: i32) -> Result<Option<i64>, DimensionError> {
        let row = dim_users::Entity::find()
            .filter(dim_users::Column::UserId.eq(user_id))
            .filter(dim_users::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.user_key))
    }

    // ========================================================================
    // Project dimension
    // ========================================================================

    /// Synchronizes the project dimension against the given operational
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures escape; per-record failures are logged
    /// and counted in the outcome.
    pub async fn sync_projects(
        &self,
        records: &[projects::Model],
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, DimensionError> {
        let mut outcome = SyncOutcome::default();

        for record in records {
            match self.sync_one_project(record, now).await {
                Ok(action) => outcome.record(action),
                Err(e) => {
                    warn!(project_id = record.id, error = %e, "project dimension sync failed for record");
                    outcome.record_failure();
                }
            }
        }

        Ok(outcome)
    }

    async fn sync_one_project(
        &self,
        record: &projects::Model,
        now: DateTime<Utc>,
    ) -> Result<ScdAction, DimensionError> {
        let current_rows = dim_projects::Entity::find()
            .filter(dim_projects::Column::ProjectId.eq(record.id))
            .filter(dim_projects::Column::IsCurrent.eq(true))
            .all(&self.db)
            .await?;

        if current_rows.len() > 1 {
            return Err(DimensionError::DuplicateCurrent {
                entity: "dim_projects",
                natural_key: record.id,
            });
        }

        let current = current_rows.first();
        let incoming = project_attributes(record);
        let action = scd::decide(current.map(dim_project_attributes).as_ref(), &incoming);

        match action {
            ScdAction::Unchanged => {}
            ScdAction::Supersede => {
                if let Some(existing) = current.cloned() {
                    let mut expire: dim_projects::ActiveModel = existing.into();
                    expire.is_current = Set(false);
                    expire.valid_to = Set(Some(now.into()));
                    expire.update(&self.db).await?;
                }
                self.insert_project_version(record, now).await?;
            }
            ScdAction::Insert => self.insert_project_version(record, now).await?,
        }

        Ok(action)
    }

    async fn insert_project_version(
        &self,
        record: &projects::Model,
        now: DateTime<Utc>,
    ) -> Result<(), DimensionError> {
        let row = dim_projects::ActiveModel {
            project_id: Set(record.id),
            name: Set(record.name.clone()),
            status: Set(record.status.clone()),
            project_type: Set(record.project_type.clone()),
            is_current: Set(true),
            valid_from: Set(now.into()),
            valid_to: Set(None),
            ..Default::default()
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    /// Resolves the current surrogate key for a project natural key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current_project_key(
        &self,
        project_id: i32,
    ) -> Result<Option<i64>, DimensionError> {
        let row = dim_projects::Entity::find()
            .filter(dim_projects::Column::ProjectId.eq(project_id))
            .filter(dim_projects::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.project_key))
    }

    // ========================================================================
    // Product dimension
    // ========================================================================

    /// Synchronizes the product dimension against the given operational
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures escape; per-record failures are logged
    /// and counted in the outcome.
    pub async fn sync_products(
        &self,
        records: &[products::Model],
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, DimensionError> {
        let mut outcome = SyncOutcome::default();

        for record in records {
            match self.sync_one_product(record, now).await {
                Ok(action) => outcome.record(action),
                Err(e) => {
                    warn!(product_id = record.id, error = %e, "product dimension sync failed for record");
                    outcome.record_failure();
                }
            }
        }

        Ok(outcome)
    }

    async fn sync_one_product(
        &self,
        record: &products::Model,
        now: DateTime<Utc>,
    ) -> Result<ScdAction, DimensionError> {
        let current_rows = dim_products::Entity::find()
            .filter(dim_products::Column::ProductId.eq(record.id))
            .filter(dim_products::Column::IsCurrent.eq(true))
            .all(&self.db)
            .await?;

        if current_rows.len() > 1 {
            return Err(DimensionError::DuplicateCurrent {
                entity: "dim_products",
                natural_key: record.id,
            });
        }

        let current = current_rows.first();
        let incoming = product_attributes(record);
        let action = scd::decide(current.map(dim_product_attributes).as_ref(), &incoming);

        match action {
            ScdAction::Unchanged => {}
            ScdAction::Supersede => {
                if let Some(existing) = current.cloned() {
                    let mut expire: dim_products::ActiveModel = existing.into();
                    expire.is_current = Set(false);
                    expire.valid_to = Set(Some(now.into()));
                    expire.update(&self.db).await?;
                }
                self.insert_product_version(record, now).await?;
            }
            ScdAction::Insert => self.insert_product_version(record, now).await?,
        }

        Ok(action)
    }

    async fn insert_product_version(
        &self,
        record: &products::Model,
        now: DateTime<Utc>,
    ) -> Result<(), DimensionError> {
        let row = dim_products::ActiveModel {
            product_id: Set(record.id),
            name: Set(record.name.clone()),
            category: Set(record.category.clone()),
            vendor: Set(record.vendor.clone()),
            is_current: Set(true),
            valid_from: Set(now.into()),
            valid_to: Set(None),
            ..Default::default()
        };
        row.insert(&self.db).await?;
        Ok(())
    }

    /// Resolves the current surrogate key for a product natural key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current_product_key(
        &self,
        product_id: i32,
    ) -> Result<Option<i64>, DimensionError> {
        let row = dim_products::Entity::find()
            .filter(dim_products::Column::ProductId.eq(product_id))
            .filter(dim_products::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.product_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn project(status: &str) -> projects::Model {
        projects::Model {
            id: 1,
            user_id: 1,
            name: "Modern House Design".to_string(),
            status: status.to_string(),
            project_type: "Residential".to_string(),
            budget: Decimal::ZERO,
            tasks_completed: 0,
            tasks_pending: 0,
            start_date: None,
            end_date: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_project_attributes_track_only_versioned_fields() {
        let mut record = project("Planning");
        let before = project_attributes(&record);

        // Measures are not tracked attributes; changing them must not
        // trigger a new dimension version
        record.tasks_completed = 5;
        record.budget = Decimal::ONE_HUNDRED;
        let after = project_attributes(&record);

        assert_eq!(before, after);
    }

    #[test]
    fn test_sync_outcome_absorb() {
        let mut a = SyncOutcome {
            processed: 3,
            inserted: 1,
            superseded: 1,
            unchanged: 1,
            failed: 0,
        };
        a.absorb(SyncOutcome {
            processed: 2,
            inserted: 0,
            superseded: 0,
            unchanged: 1,
            failed: 1,
        });
        assert_eq!(a.processed, 5);
        assert_eq!(a.unchanged, 2);
        assert_eq!(a.failed, 1);
    }

    #[test]
    fn test_outcome_records_each_action() {
        let mut outcome = SyncOutcome::default();
        outcome.record(ScdAction::Insert);
        outcome.record(ScdAction::Supersede);
        outcome.record(ScdAction::Unchanged);
        outcome.record_failure();

        assert_eq!(outcome.processed, 4);
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.superseded, 1);
        assert_eq!(outcome.unchanged, 1);
        assert_eq!(outcome.failed, 1);
    }
}
