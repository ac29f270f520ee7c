//! Core error types.

use snafu::Snafu;

/// Result type for core operations.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Errors produced by the pure core functions.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CoreError {
    /// The task graph contains at least one cycle.
    ///
    /// The message is intentionally terse; per-task cycle localization is
    /// the validator's job.
    #[snafu(display("circular dependency detected"))]
    CircularDependency,

    /// A dependency edge points at a task ID absent from the task map.
    #[snafu(display("task {task_id:?} depends on unknown task {depend_id:?}"))]
    UnknownDependency {
        /// ID of the task carrying the edge.
        task_id: String,
        /// The missing target ID.
        depend_id: String,
    },

    /// A `when` condition pattern is not a valid regular expression.
    #[snafu(display("invalid condition pattern {pattern:?}: {source}"))]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        source: regex::Error,
    },

    /// The caller's cancellation signal was observed mid-analysis.
    #[snafu(display("cancelled"))]
    Cancelled,
}
