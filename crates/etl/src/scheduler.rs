//! Cadence driver for the warehouse pipeline.
//!
//! Two independent tokio tasks: a daily full run fired at a configured
//! UTC hour, and a fact refresh fired at the top of every hour. Both
//! loops swallow nothing; the orchestrator already folds every failure
//! into its report, so a bad run never kills a loop and the next tick
//! fires normally. Overlap between the two cadences resolves through the
//! orchestrator's run lock.

use std::sync::Arc;

use chrono::{DateTime, DurationRound, NaiveTime, Utc};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use crate::orchestrator::WarehouseEtl;
use atelier_shared::config::EtlConfig;

/// Time remaining until the next daily fire at `hour:00:00` UTC, strictly
/// after `now`. Hours outside `0..24` wrap.
#[must_use]
pub fn until_next_daily(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    let fire_time = NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut target = now.date_naive().and_time(fire_time).and_utc();
    if target <= now {
        target += chrono::Duration::days(1);
    }
    (target - now).to_std().unwrap_or_default()
}

/// Time remaining until the next top of the hour strictly after `now`.
#[must_use]
pub fn until_next_hour(now: DateTime<Utc>) -> std::time::Duration {
    let floor = now
        .duration_trunc(chrono::Duration::hours(1))
        .unwrap_or(now);
    (floor + chrono::Duration::hours(1) - now)
        .to_std()
        .unwrap_or_default()
}

/// Spawns and owns the two cadence tasks.
pub struct EtlScheduler {
    etl: Arc<WarehouseEtl>,
    config: EtlConfig,
}

impl EtlScheduler {
    /// Creates a scheduler over a shared pipeline.
    #[must_use]
    pub const fn new(etl: Arc<WarehouseEtl>, config: EtlConfig) -> Self {
        Self { etl, config }
    }

    /// Spawns the daily and hourly loops. The returned handles live as
    /// long as the process; the loops never exit on their own.
    #[must_use]
    pub fn spawn(self) -> (JoinHandle<()>, JoinHandle<()>) {
        let daily = tokio::spawn(Self::daily_loop(Arc::clone(&self.etl), self.config.daily_hour));
        let hourly = tokio::spawn(Self::hourly_loop(self.etl));
        (daily, hourly)
    }

    async fn daily_loop(etl: Arc<WarehouseEtl>, hour: u32) {
        info!(hour, "daily warehouse run scheduled");
        loop {
            let wait = until_next_daily(Utc::now(), hour);
            debug!(wait_secs = wait.as_secs(), "sleeping until next daily run");
            time::sleep(wait).await;

            let report = etl.run_daily().await;
            debug!(run_id = %report.run_id, status = ?report.status, "daily trigger finished");
        }
    }

    async fn hourly_loop(etl: Arc<WarehouseEtl>) {
        info!("hourly fact refresh scheduled");
        loop {
            time::sleep(until_next_hour(Utc::now())).await;

            let report = etl.run_hourly_facts().await;
            debug!(run_id = %report.run_id, status = ?report.status, "hourly trigger finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
    }

    #[rstest]
    #[case(at(0, 30, 0), 1, 30 * 60)] // half an hour before the fire hour
    #[case(at(1, 0, 0), 1, 24 * 3600)] // exactly at the fire hour: next day
    #[case(at(2, 0, 0), 1, 23 * 3600)] // just past: tomorrow
    #[case(at(23, 59, 0), 0, 60)] // midnight fire hour
    fn test_until_next_daily(#[case] now: DateTime<Utc>, #[case] hour: u32, #[case] secs: u64) {
        assert_eq!(until_next_daily(now, hour).as_secs(), secs);
    }

    #[test]
    fn test_out_of_range_hour_wraps() {
        assert_eq!(
            until_next_daily(at(0, 0, 0), 25),
            until_next_daily(at(0, 0, 0), 1)
        );
    }

    #[rstest]
    #[case(at(14, 0, 0), 3600)] // exactly on the boundary: full hour
    #[case(at(14, 59, 59), 1)]
    #[case(at(14, 30, 0), 30 * 60)]
    #[case(at(23, 30, 0), 30 * 60)] // crosses midnight
    fn test_until_next_hour(#[case] now: DateTime<Utc>, #[case] secs: u64) {
        assert_eq!(until_next_hour(now).as_secs(), secs);
    }

    #[test]
    fn test_waits_are_never_zero() {
        assert!(until_next_daily(at(1, 0, 0), 1) > std::time::Duration::ZERO);
        assert!(until_next_hour(at(5, 0, 0)) > std::time::Duration::ZERO);
    }
}
