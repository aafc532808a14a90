//! ETL run state machine and structured run reports.
//!
//! A run only ever advances `Idle -> RunningDateDim -> RunningDimensions ->
//! RunningFacts -> Completed`; a step failure moves to the terminal
//! `Failed` state and records which step failed. Facts are never loaded
//! before dimensions are consistent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The three sequenced steps of a full warehouse run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EtlStep {
    /// Date dimension horizon extension.
    DateDimension,
    /// SCD2 dimension synchronization.
    Dimensions,
    /// Fact table loads.
    Facts,
}

impl std::fmt::Display for EtlStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateDimension => write!(f, "date_dimension"),
            Self::Dimensions => write!(f, "dimensions"),
            Self::Facts => write!(f, "facts"),
        }
    }
}

/// Terminal status of a triggered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All steps committed.
    Completed,
    /// A step failed; later steps were not attempted.
    Failed,
    /// The trigger overlapped an in-flight run and was rejected.
    Skipped,
}

/// State of an orchestrated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run in progress.
    Idle,
    /// Extending the date dimension.
    RunningDateDim,
    /// Synchronizing dimensions.
    RunningDimensions,
    /// Loading facts.
    RunningFacts,
    /// Terminal: all steps committed.
    Completed,
    /// Terminal: the named step failed.
    Failed(EtlStep),
}

impl RunState {
    /// Advances to the next state in the fixed step sequence.
    ///
    /// Terminal states stay put; the orchestrator never reuses a state
    /// value after completion.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::Idle => Self::RunningDateDim,
            Self::RunningDateDim => Self::RunningDimensions,
            Self::RunningDimensions => Self::RunningFacts,
            Self::RunningFacts | Self::Completed => Self::Completed,
            Self::Failed(step) => Self::Failed(step),
        }
    }

    /// Marks the in-progress step as failed. Terminal states stay put.
    #[must_use]
    pub const fn fail(self) -> Self {
        match self {
            Self::RunningDateDim => Self::Failed(EtlStep::DateDimension),
            Self::RunningDimensions => Self::Failed(EtlStep::Dimensions),
            Self::RunningFacts => Self::Failed(EtlStep::Facts),
            Self::Completed => Self::Completed,
            Self::Idle => Self::Idle,
            Self::Failed(step) => Self::Failed(step),
        }
    }

    /// The step currently executing, if any.
    #[must_use]
    pub const fn current_step(self) -> Option<EtlStep> {
        match self {
            Self::RunningDateDim => Some(EtlStep::DateDimension),
            Self::RunningDimensions => Some(EtlStep::Dimensions),
            Self::RunningFacts => Some(EtlStep::Facts),
            Self::Idle | Self::Completed | Self::Failed(_) => None,
        }
    }

    /// Whether the run has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Per-step entity counts. Every trigger call reports these, even on
/// failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Entities handled successfully.
    pub processed: u64,
    /// Entities skipped (e.g. missing dimension rows).
    pub skipped: u64,
    /// Entities that failed in isolation.
    pub failed: u64,
}

impl StepReport {
    /// Whether the step finished without any entity-level work lost.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Merges counts from another report into this one.
    pub fn absorb(&mut self, other: Self) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// What triggered a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTrigger {
    /// Daily full pipeline.
    Daily,
    /// Hourly fact-only refresh.
    HourlyFacts,
}

/// Structured result of one trigger call. This is the only thing the
/// scheduler ever sees; no error escapes a trigger uncaught.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique id for correlating log lines of one run.
    pub run_id: Uuid,
    /// What triggered this run.
    pub trigger: RunTrigger,
    /// Terminal status.
    pub status: RunStatus,
    /// The failing step when `status == Failed`.
    pub failing_step: Option<EtlStep>,
    /// Underlying cause when `status == Failed`.
    pub error: Option<String>,
    /// Calendar rows inserted by the date dimension step.
    pub date_dim_rows: u64,
    /// Dimension synchronization counts.
    pub dimensions: StepReport,
    /// Fact load counts.
    pub facts: StepReport,
    /// Run start time.
    pub started_at: DateTime<Utc>,
    /// Run end time.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Starts an empty report for a new run.
    #[must_use]
    pub fn begin(trigger: RunTrigger) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            trigger,
            status: RunStatus::Completed,
            failing_step: None,
            error: None,
            date_dim_rows: 0,
            dimensions: StepReport::default(),
            facts: StepReport::default(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Finalizes the report as a rejected overlapping trigger.
    #[must_use]
    pub fn skipped(trigger: RunTrigger) -> Self {
        let mut report = Self::begin(trigger);
        report.status = RunStatus::Skipped;
        report.finished_at = Utc::now();
        report
    }

    /// Records a step failure and finalizes the status.
    pub fn record_failure(&mut self, step: EtlStep, cause: &str) {
        self.status = RunStatus::Failed;
        self.failing_step = Some(step);
        self.error = Some(cause.to_string());
    }

    /// Whether any entity failed in isolation even though the run itself
    /// completed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.dimensions.failed > 0 || self.facts.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_sequence() {
        let mut state = RunState::Idle;
        let expected = [
            RunState::RunningDateDim,
            RunState::RunningDimensions,
            RunState::RunningFacts,
            RunState::Completed,
        ];
        for want in expected {
            state = state.advance();
            assert_eq!(state, want);
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn test_failure_short_circuits() {
        let state = RunState::Idle.advance().advance(); // RunningDimensions
        let failed = state.fail();
        assert_eq!(failed, RunState::Failed(EtlStep::Dimensions));
        assert!(failed.is_terminal());
        // Terminal: no further advance changes it
        assert_eq!(failed.advance(), failed);
    }

    #[test]
    fn test_states_only_advance() {
        // Completed never regresses
        let done = RunState::Completed;
        assert_eq!(done.advance(), RunState::Completed);
        assert_eq!(done.fail(), RunState::Completed);
    }

    #[test]
    fn test_current_step() {
        assert_eq!(RunState::Idle.current_step(), None);
        assert_eq!(
            RunState::RunningFacts.current_step(),
            Some(EtlStep::Facts)
        );
        assert_eq!(RunState::Completed.current_step(), None);
    }

    #[test]
    fn test_step_report_absorb() {
        let mut report = StepReport {
            processed: 2,
            skipped: 1,
            failed: 0,
        };
        report.absorb(StepReport {
            processed: 3,
            skipped: 0,
            failed: 1,
        });
        assert_eq!(report.processed, 5);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_run_report_failure() {
        let mut report = RunReport::begin(RunTrigger::Daily);
        report.record_failure(EtlStep::Facts, "connection reset");
        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.failing_step, Some(EtlStep::Facts));
        assert_eq!(report.error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_skipped_report() {
        let report = RunReport::skipped(RunTrigger::HourlyFacts);
        assert_eq!(report.status, RunStatus::Skipped);
        assert!(report.failing_step.is_none());
    }

    #[test]
    fn test_degraded_detection() {
        let mut report = RunReport::begin(RunTrigger::Daily);
        assert!(!report.is_degraded());
        report.dimensions.failed = 1;
        assert!(report.is_degraded());
    }
}
