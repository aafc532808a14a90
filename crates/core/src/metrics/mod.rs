//! Fact measure arithmetic.
//!
//! All monetary totals and percentages are `Decimal` (2 fractional digits
//! for money); percentages are bounded to `[0, 100]`. Zero denominators
//! yield zero, never an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Completion percentage of a project, bounded `[0, 100]`, 2 decimal
/// places. Returns zero when there are no tasks at all.
#[must_use]
pub fn completion_percent(tasks_completed: i32, tasks_pending: i32) -> Decimal {
    (completion_trend(tasks_completed, tasks_pending) * HUNDRED)
        .round_dp(2)
        .clamp(Decimal::ZERO, HUNDRED)
}

/// Completion ratio `completed / (completed + pending)`, defined as zero
/// when both counts are zero.
#[must_use]
pub fn completion_trend(tasks_completed: i32, tasks_pending: i32) -> Decimal {
    let total = i64::from(tasks_completed) + i64::from(tasks_pending);
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(tasks_completed) / Decimal::from(total)
}

/// One day of a project's daily snapshot series.
#[derive(Debug, Clone, Serialize)]
pub struct DailyProjectRow {
    /// Calendar date of the snapshot.
    pub date: NaiveDate,
    /// Linked products at snapshot time.
    pub products_count: i32,
    /// Total monetary value of linked products.
    pub total_value: Decimal,
    /// Tasks completed so far.
    pub tasks_completed: i32,
    /// Tasks still pending.
    pub tasks_pending: i32,
    /// Budget spent so far.
    pub budget_utilized: Decimal,
}

/// Summary over a project's daily snapshot series.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    /// Average tasks completed per day, 2 decimal places.
    pub avg_daily_progress: Decimal,
    /// Total budget utilized over the series.
    pub total_budget_utilized: Decimal,
    /// Per-day product counts.
    pub product_count_trend: Vec<i32>,
    /// Per-day completion ratio (zero when a day has no tasks).
    pub completion_trend: Vec<Decimal>,
}

impl TrendSummary {
    /// Builds the summary from a daily series. An empty series yields a
    /// zeroed summary.
    #[must_use]
    pub fn from_daily(rows: &[DailyProjectRow]) -> Self {
        if rows.is_empty() {
            return Self {
                avg_daily_progress: Decimal::ZERO,
                total_budget_utilized: Decimal::ZERO,
                product_count_trend: Vec::new(),
                completion_trend: Vec::new(),
            };
        }

        let completed_sum: i64 = rows.iter().map(|r| i64::from(r.tasks_completed)).sum();
        let avg_daily_progress =
            (Decimal::from(completed_sum) / Decimal::from(rows.len())).round_dp(2);

        Self {
            avg_daily_progress,
            total_budget_utilized: rows.iter().map(|r| r.budget_utilized).sum(),
            product_count_trend: rows.iter().map(|r| r.products_count).collect(),
            completion_trend: rows
                .iter()
                .map(|r| completion_trend(r.tasks_completed, r.tasks_pending))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn row(completed: i32, pending: i32, budget: Decimal) -> DailyProjectRow {
        DailyProjectRow {
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            products_count: 2,
            total_value: dec!(1000.00),
            tasks_completed: completed,
            tasks_pending: pending,
            budget_utilized: budget,
        }
    }

    #[test]
    fn test_completion_trend_zero_denominator_is_zero() {
        assert_eq!(completion_trend(0, 0), Decimal::ZERO);
    }

    #[rstest]
    #[case(3, 1, dec!(75.00))]
    #[case(1, 2, dec!(33.33))]
    #[case(5, 0, dec!(100.00))]
    #[case(0, 7, dec!(0.00))]
    #[case(0, 0, dec!(0))]
    fn test_completion_percent(#[case] done: i32, #[case] pending: i32, #[case] expected: Decimal) {
        assert_eq!(completion_percent(done, pending), expected);
    }

    #[test]
    fn test_completion_percent_bounded() {
        let pct = completion_percent(i32::MAX, 0);
        assert!(pct >= Decimal::ZERO && pct <= dec!(100));
    }

    #[test]
    fn test_trend_summary_empty_series() {
        let summary = TrendSummary::from_daily(&[]);
        assert_eq!(summary.avg_daily_progress, Decimal::ZERO);
        assert_eq!(summary.total_budget_utilized, Decimal::ZERO);
        assert!(summary.product_count_trend.is_empty());
        assert!(summary.completion_trend.is_empty());
    }

    #[test]
    fn test_trend_summary_aggregates() {
        let rows = vec![
            row(3, 1, dec!(500.00)),
            row(1, 3, dec!(250.50)),
            row(0, 0, dec!(0.00)),
        ];
        let summary = TrendSummary::from_daily(&rows);

        // (3 + 1 + 0) / 3 days
        assert_eq!(summary.avg_daily_progress, dec!(1.33));
        assert_eq!(summary.total_budget_utilized, dec!(750.50));
        assert_eq!(summary.product_count_trend, vec![2, 2, 2]);
        assert_eq!(summary.completion_trend[0], dec!(0.75));
        // Day with no tasks contributes zero, not an error
        assert_eq!(summary.completion_trend[2], Decimal::ZERO);
    }
}
