//! Core run-configuration types and pure functions for larch.
//!
//! This crate provides the foundational types and pure functions for the
//! larch run-configuration compiler. It is designed to be lightweight with
//! minimal dependencies, allowing other crates to depend on it without
//! pulling in async runtimes or the compiler shell.
//!
//! # Modules
//!
//! - [`config`] - User-facing pipeline configuration types (Config, Pipeline, Element)
//! - [`run`] - Compiled run-configuration types (RunConfig, RunConfigTask)
//! - [`error`] - Core error types
//! - [`verified`] - Pure functions for compilation logic (env, when, graph)
//!
//! # Design Philosophy
//!
//! This crate follows the Functional Core, Imperative Shell pattern:
//! - Pure functions in `verified/` are deterministic and testable
//! - Types are serializable for the scheduler-facing contract
//! - No async code or I/O operations
//!
//! # Tiger Style
//!
//! - Bounded iteration: level assignment runs at most `tasks + 1` passes
//! - Explicit sentinel values (`LEVEL_UNASSIGNED`) over implicit zeroes
//! - Missing lookups resolve to explicit policy, never panics

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod run;
pub mod verified;

// Re-export commonly used types at crate root
pub use config::Config;
pub use config::Depend;
pub use config::DependCondition;
pub use config::Element;
pub use config::EnvVar;
pub use config::Pipeline;
pub use config::RuntimeKind;
pub use config::RuntimeTemplate;
pub use config::TaskTemplate;
pub use config::When;
pub use config::WhenCondition;
pub use config::WhenConditionKind;
pub use config::WhenConditions;
pub use error::CoreError;
pub use error::Result;
pub use run::RunConfig;
pub use run::RunConfigTask;
pub use run::RunConfigTaskDepend;
pub use run::LEVEL_UNASSIGNED;
pub use verified::{
    // Environment resolution
    merge_env,
    resolve_env,
    // Graph analysis
    gen_tasks_levels,
    gen_tasks_levels_with_cancel,
    get_all_parents,
    get_parents,
    // When evaluation
    match_condition,
    match_conditions,
    match_when,
};
