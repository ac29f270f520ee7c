//! Error types for run-configuration compilation.
//!
//! Compilation errors (missing pipeline, unknown references, cancellation)
//! short-circuit; structural validation errors are collected into a
//! [`CheckErrors`] report so users see every problem in one pass.

use larch_ci_core::CoreError;
use snafu::Snafu;

use crate::check::CheckErrors;

/// Result type for compilation.
pub type Result<T, E = RunConfigError> = std::result::Result<T, E>;

/// Run-configuration compilation errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RunConfigError {
    /// The requested pipeline does not exist in the config.
    #[snafu(display("pipeline {name:?} not found"))]
    PipelineNotFound {
        /// The requested pipeline name.
        name: String,
    },

    /// An element references a task template that does not exist.
    #[snafu(display("element {element:?} references unknown task {task:?}"))]
    UnknownTask {
        /// The referencing element.
        element: String,
        /// The missing task template name.
        task: String,
    },

    /// A task template references a runtime template that does not exist.
    #[snafu(display("task {task:?} references unknown runtime {runtime:?}"))]
    UnknownRuntime {
        /// The referencing task template.
        task: String,
        /// The missing runtime template name.
        runtime: String,
    },

    /// An element depends on an element absent from the pipeline.
    #[snafu(display("element {element:?} depends on unknown element {depend:?}"))]
    UnknownDependElement {
        /// The element carrying the edge.
        element: String,
        /// The missing target element name.
        depend: String,
    },

    /// An element's `when` predicate carries an invalid regexp pattern.
    #[snafu(display("element {element:?} has an invalid when condition: {source}"))]
    InvalidWhenCondition {
        /// The offending element.
        element: String,
        /// The underlying pattern error.
        source: CoreError,
    },

    /// Level assignment failed (cycle or dangling edge).
    #[snafu(display("{source}"))]
    Levels {
        /// The underlying graph error.
        source: CoreError,
    },

    /// The compiled graph failed structural validation.
    #[snafu(display("{errors}"))]
    Validation {
        /// The aggregated report, one entry per problem.
        errors: CheckErrors,
    },

    /// The caller cancelled the compilation.
    #[snafu(display("run config generation cancelled"))]
    Cancelled,
}
