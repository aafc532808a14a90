//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Entity-level errors (`TransientDependency`, `DataIntegrity`) are caught
/// and aggregated into run reports; step-level errors (`StepFailed`,
/// `Database`) abort the remaining steps of a run. `RunInProgress` marks a
/// rejected overlapping trigger and is reported as a skipped run, not a
/// failure.
#[derive(Debug, Error)]
pub enum AppError {
    /// A dimension row required by a fact load is not yet current.
    #[error("Dimension not yet current: {0}")]
    TransientDependency(String),

    /// The at-most-one-current-row invariant was violated.
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// An ETL step failed and the run was aborted.
    #[error("ETL step '{step}' failed: {cause}")]
    StepFailed {
        /// Name of the failing step.
        step: String,
        /// Underlying cause.
        cause: String,
    },

    /// A trigger arrived while a run was still in flight.
    #[error("A warehouse run is already in progress")]
    RunInProgress,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns the stable error code for structured run reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TransientDependency(_) => "TRANSIENT_DEPENDENCY",
            Self::DataIntegrity(_) => "DATA_INTEGRITY",
            Self::StepFailed { .. } => "STEP_FAILED",
            Self::RunInProgress => "RUN_IN_PROGRESS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns true if the error leaves the run recoverable by the next
    /// scheduled tick without operator intervention.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::TransientDependency(_) | Self::RunInProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::TransientDependency(String::new()).error_code(),
            "TRANSIENT_DEPENDENCY"
        );
        assert_eq!(
            AppError::DataIntegrity(String::new()).error_code(),
            "DATA_INTEGRITY"
        );
        assert_eq!(
            AppError::StepFailed {
                step: "facts".to_string(),
                cause: String::new()
            }
            .error_code(),
            "STEP_FAILED"
        );
        assert_eq!(AppError::RunInProgress.error_code(), "RUN_IN_PROGRESS");
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(AppError::Config(String::new()).error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AppError::TransientDependency(String::new()).is_recoverable());
        assert!(AppError::RunInProgress.is_recoverable());
        assert!(!AppError::DataIntegrity(String::new()).is_recoverable());
        assert!(
            !AppError::StepFailed {
                step: "dimensions".to_string(),
                cause: "connection reset".to_string()
            }
            .is_recoverable()
        );
    }
}
