//! Read-only analytics queries over the warehouse.
//!
//! The four aggregations consumed by the API layer. Facts join to
//! dimensions through the surrogate key recorded at load time, so
//! historical rows stay correctly attributed after a dimension row is
//! superseded; the `is_current` filter is used only to resolve the
//! attributes shown for an entity today. Rows are fetched filtered and
//! folded with `Decimal` in Rust.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use atelier_core::metrics::{DailyProjectRow, TrendSummary};
use atelier_shared::DateKey;

use crate::entities::{
    dim_products, dim_projects, dim_users, fact_product_usage, fact_project_daily,
    fact_project_metrics,
};

/// Error types for analytics queries.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One project/date bucket of the performance query.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPerformanceRow {
    /// Project name (current attributes).
    pub project_name: String,
    /// Snapshot date.
    pub date: NaiveDate,
    /// Summed monetary value.
    pub total_value: Decimal,
    /// Summed linked product counts.
    pub total_products: i64,
    /// Average completion percentage, 2 decimal places.
    pub avg_completion: Decimal,
}

/// One product bucket of the top-products query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProductRow {
    /// Product name (current attributes).
    pub product_name: String,
    /// Summed quantity used.
    pub total_usage: i64,
    /// Summed cost.
    pub total_cost: Decimal,
    /// Average efficiency score, 2 decimal places.
    pub avg_efficiency: Decimal,
}

/// One user bucket of the activity query.
#[derive(Debug, Clone, Serialize)]
pub struct UserActivityRow {
    /// Username (current attributes).
    pub username: String,
    /// Number of metric snapshots recorded for this user's projects.
    pub total_updates: i64,
    /// Summed value under management.
    pub total_value_managed: Decimal,
}

/// Daily series plus summary for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTrends {
    /// Per-day snapshot rows, date ascending.
    pub daily_metrics: Vec<DailyProjectRow>,
    /// Aggregates over the series.
    pub summary: TrendSummary,
}

/// Orders product buckets by usage descending and truncates to `limit`.
///
/// Ties break by name so the ordering is deterministic.
#[must_use]
pub fn rank_top_products(mut rows: Vec<TopProductRow>, limit: usize) -> Vec<TopProductRow> {
    rows.sort_by(|a, b| {
        b.total_usage
            .cmp(&a.total_usage)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    rows.truncate(limit);
    rows
}

/// Read-only repository over the warehouse star schema.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    db: DatabaseConnection,
}

impl AnalyticsRepository {
    /// Creates a new analytics repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Project performance over `[start, end]`: per project and date, sum
    /// of value and product counts plus average completion, ordered by
    /// date ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn project_performance(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProjectPerformanceRow>, AnalyticsError> {
        let facts = fact_project_metrics::Entity::find()
            .filter(fact_project_metrics::Column::DateKey.gte(DateKey::from_date(start).value()))
            .filter(fact_project_metrics::Column::DateKey.lte(DateKey::from_date(end).value()))
            .all(&self.db)
            .await?;

        let names = self
            .project_names(facts.iter().map(|f| f.project_key))
            .await?;

        // (date, name) -> (sum value, sum products, sum completion, buckets)
        let mut grouped: BTreeMap<(NaiveDate, String), (Decimal, i64, Decimal, i64)> =
            BTreeMap::new();

        for fact in &facts {
            let Some(date) = DateKey::from_raw(fact.date_key).to_date() else {
                continue;
            };
            let name = names
                .get(&fact.project_key)
                .cloned()
                .unwrap_or_else(|| format!("project #{}", fact.project_key));

            let entry = grouped
                .entry((date, name))
                .or_insert((Decimal::ZERO, 0, Decimal::ZERO, 0));
            entry.0 += fact.total_value;
            entry.1 += i64::from(fact.total_products);
            entry.2 += fact.completion_percentage;
            entry.3 += 1;
        }

        Ok(grouped
            .into_iter()
            .map(
                |((date, project_name), (value, products, completion, buckets))| {
                    ProjectPerformanceRow {
                        project_name,
                        date,
                        total_value: value,
                        total_products: products,
                        avg_completion: (completion / Decimal::from(buckets)).round_dp(2),
                    }
                },
            )
            .collect())
    }

    /// Top products by summed usage, descending, limited to `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn top_products(&self, limit: usize) -> Result<Vec<TopProductRow>, AnalyticsError> {
        let facts = fact_product_usage::Entity::find().all(&self.db).await?;

        let names = self
            .product_names(facts.iter().map(|f| f.product_key))
            .await?;

        // name -> (sum usage, sum cost, sum efficiency, buckets)
        let mut grouped: BTreeMap<String, (i64, Decimal, Decimal, i64)> = BTreeMap::new();
        for fact in &facts {
            let name = names
                .get(&fact.product_key)
                .cloned()
                .unwrap_or_else(|| format!("product #{}", fact.product_key));
            let entry = grouped
                .entry(name)
                .or_insert((0, Decimal::ZERO, Decimal::ZERO, 0));
            entry.0 += i64::from(fact.quantity_used);
            entry.1 += fact.total_cost;
            entry.2 += fact.efficiency_score;
            entry.3 += 1;
        }

        let rows = grouped
            .into_iter()
            .map(
                |(product_name, (usage, cost, efficiency, buckets))| TopProductRow {
                    product_name,
                    total_usage: usage,
                    total_cost: cost,
                    avg_efficiency: (efficiency / Decimal::from(buckets)).round_dp(2),
                },
            )
            .collect();

        Ok(rank_top_products(rows, limit))
    }

    /// User activity over the last `days` days: per user, snapshot count
    /// and summed value under management.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn user_activity(&self, days: i64) -> Result<Vec<UserActivityRow>, AnalyticsError> {
        let cutoff = Utc::now().date_naive() - Duration::days(days);

        let facts = fact_project_metrics::Entity::find()
            .filter(fact_project_metrics::Column::DateKey.gte(DateKey::from_date(cutoff).value()))
            .all(&self.db)
            .await?;

        let names = self.user_names(facts.iter().map(|f| f.user_key)).await?;

        let mut grouped: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        for fact in &facts {
            let name = names
                .get(&fact.user_key)
                .cloned()
                .unwrap_or_else(|| format!("user #{}", fact.user_key));
            let entry = grouped.entry(name).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += fact.total_value;
        }

        Ok(grouped
            .into_iter()
            .map(|(username, (updates, value))| UserActivityRow {
                username,
                total_updates: updates,
                total_value_managed: value,
            })
            .collect())
    }

    /// Daily trend series for one project over the last `days` days.
    ///
    /// All historical surrogate keys of the project participate, so
    /// snapshots taken before a version change still count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn project_trends(
        &self,
        project_id: i32,
        days: i64,
    ) -> Result<ProjectTrends, AnalyticsError> {
        let cutoff = Utc::now().date_naive() - Duration::days(days);

        let version_keys: Vec<i64> = dim_projects::Entity::find()
            .filter(dim_projects::Column::ProjectId.eq(project_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| row.project_key)
            .collect();

        let facts = fact_project_daily::Entity::find()
            .filter(fact_project_daily::Column::ProjectKey.is_in(version_keys))
            .filter(fact_project_daily::Column::DateKey.gte(DateKey::from_date(cutoff).value()))
            .order_by_asc(fact_project_daily::Column::DateKey)
            .all(&self.db)
            .await?;

        let daily_metrics: Vec<DailyProjectRow> = facts
            .iter()
            .filter_map(|fact| {
                DateKey::from_raw(fact.date_key).to_date().map(|date| {
                    DailyProjectRow {
                        date,
                        products_count: fact.products_count,
                        total_value: fact.total_value,
                        tasks_completed: fact.tasks_completed,
                        tasks_pending: fact.tasks_pending,
                        budget_utilized: fact.budget_utilized,
                    }
                })
            })
            .collect();

        let summary = TrendSummary::from_daily(&daily_metrics);

        Ok(ProjectTrends {
            daily_metrics,
            summary,
        })
    }

    // ========================================================================
    // Display-name resolution (current attributes)
    // ========================================================================

    async fn project_names(
        &self,
        keys: impl Iterator<Item = i64>,
    ) -> Result<HashMap<i64, String>, AnalyticsError> {
        let keys: Vec<i64> = keys.collect();
        let versions = dim_projects::Entity::find()
            .filter(dim_projects::Column::ProjectKey.is_in(keys))
            .all(&self.db)
            .await?;

        let natural_ids: Vec<i32> = versions.iter().map(|v| v.project_id).collect();
        let current: HashMap<i32, String> = dim_projects::Entity::find()
            .filter(dim_projects::Column::ProjectId.is_in(natural_ids))
            .filter(dim_projects::Column::IsCurrent.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.project_id, row.name))
            .collect();

        // Prefer the current name; fall back to the version the fact saw
        Ok(versions
            .into_iter()
            .map(|v| {
                let name = current.get(&v.project_id).cloned().unwrap_or(v.name);
                (v.project_key, name)
            })
            .collect())
    }

    async fn product_names(
        &self,
        keys: impl Iterator<Item = i64>,
    ) -> Result<HashMap<i64, String>, AnalyticsError> {
        let keys: Vec<i64> = keys.collect();
        let versions = dim_products::Entity::find()
            .filter(dim_products::Column::ProductKey.is_in(keys))
            .all(&self.db)
            .await?;

        let natural_ids: Vec<i32> = versions.iter().map(|v| v.product_id).collect();
        let current: HashMap<i32, String> = dim_products::Entity::find()
            .filter(dim_products::Column::ProductId.is_in(natural_ids))
            .filter(dim_products::Column::IsCurrent.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.product_id, row.name))
            .collect();

        Ok(versions
            .into_iter()
            .map(|v| {
                let name = current.get(&v.product_id).cloned().unwrap_or(v.name);
                (v.product_key, name)
            })
            .collect())
    }

    async fn user_names(
        &self,
        keys: impl Iterator<Item = i64>,
    ) -> Result<HashMap<i64, String>, AnalyticsError> {
        let keys: Vec<i64> = keys.collect();
        let versions = dim_users::Entity::find()
            .filter(dim_users::Column::UserKey.is_in(keys))
            .all(&self.db)
            .await?;

        let natural_ids: Vec<i32> = versions.iter().map(|v| v.user_id).collect();
        let current: HashMap<i32, String> = dim_users::Entity::find()
            .filter(dim_users::Column::UserId.is_in(natural_ids))
            .filter(dim_users::Column::IsCurrent.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.user_id, row.username))
            .collect();

        Ok(versions
            .into_iter()
            .map(|v| {
                let name = current.get(&v.user_id).cloned().unwrap_or(v.username);
                (v.user_key, name)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bucket(name: &str, usage: i64) -> TopProductRow {
        TopProductRow {
            product_name: name.to_string(),
            total_usage: usage,
            total_cost: dec!(100.00),
            avg_efficiency: dec!(90.00),
        }
    }

    #[test]
    fn test_rank_orders_descending_and_truncates() {
        let rows = vec![
            bucket("Solar Panels", 50),
            bucket("Smart Lighting System", 30),
            bucket("Heat Pump", 80),
        ];
        let ranked = rank_top_products(rows, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].total_usage, 80);
        assert_eq!(ranked[1].total_usage, 50);
    }

    #[test]
    fn test_rank_limit_larger_than_input() {
        let ranked = rank_top_products(vec![bucket("Solar Panels", 10)], 10);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_rank_ties_break_by_name() {
        let rows = vec![bucket("Zinc Cladding", 30), bucket("Ash Flooring", 30)];
        let ranked = rank_top_products(rows, 2);
        assert_eq!(ranked[0].product_name, "Ash Flooring");
    }

    #[test]
    fn test_rank_empty_input() {
        assert!(rank_top_products(Vec::new(), 5).is_empty());
    }
}
