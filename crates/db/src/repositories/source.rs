//! Read-only access to the operational source tables.
//!
//! The ETL engine never writes to these tables; it only snapshots them.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{products, projects, users};

/// Error types for source reads.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Read-only repository over the operational store.
#[derive(Debug, Clone)]
pub struct SourceRepository {
    db: DatabaseConnection,
}

impl SourceRepository {
    /// Creates a new source repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches all operational users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all_users(&self) -> Result<Vec<users::Model>, SourceError> {
        let results = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;
        Ok(results)
    }

    /// Fetches all operational projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all_projects(&self) -> Result<Vec<projects::Model>, SourceError> {
        let results = projects::Entity::find()
            .order_by_asc(projects::Column::Id)
            .all(&self.db)
            .await?;
        Ok(results)
    }

    /// Fetches all operational products.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all_products(&self) -> Result<Vec<products::Model>, SourceError> {
        let results = products::Entity::find()
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await?;
        Ok(results)
    }

    /// Fetches the products linked to one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn products_for_project(
        &self,
        project_id: i32,
    ) -> Result<Vec<products::Model>, SourceError> {
        let results = products::Entity::find()
            .filter(products::Column::ProjectId.eq(project_id))
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await?;
        Ok(results)
    }
}
