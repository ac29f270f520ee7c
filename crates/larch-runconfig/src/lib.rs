//! Larch run-configuration compiler.
//!
//! This crate turns a user-authored pipeline definition into the frozen
//! task graph the larch scheduler dispatches:
//!
//! - **Compilation**: one task per pipeline element, runtime and
//!   environment fully resolved from the literal and named-variable
//!   providers, dependency edges translated to stable task IDs
//! - **Graph analysis**: scheduling levels for wave-based dispatch and
//!   cycle detection with per-task diagnostics
//! - **Gating**: `when` predicates evaluated against the trigger context;
//!   skipped tasks stay in the graph, flagged
//!
//! The heavy lifting is pure and lives in `larch-ci-core`; this crate is
//! the orchestration shell plus the validator and the injectable identity
//! generator.
//!
//! # Usage
//!
//! ```rust,ignore
//! use larch_runconfig::{gen_run_config, RandomTaskIds, TriggerContext};
//! use tokio_util::sync::CancellationToken;
//!
//! let trigger = TriggerContext { branch: Some("main".to_string()), ..Default::default() };
//! let run_config = gen_run_config(
//!     &RandomTaskIds,
//!     &config,
//!     "deploy",
//!     &env,
//!     &variables,
//!     &trigger,
//!     &CancellationToken::new(),
//! )?;
//! ```
//!
//! A compilation is synchronous and touches no I/O; independent
//! compilations may run in parallel without coordination, and the emitted
//! [`RunConfig`](larch_ci_core::RunConfig) is immutable.

#![warn(missing_docs)]

pub mod check;
pub mod compile;
pub mod error;
pub mod identity;

// Re-export the core contract types alongside the compiler entry points.
pub use check::check_run_config;
pub use check::CheckError;
pub use check::CheckErrors;
pub use compile::gen_run_config;
pub use compile::TriggerContext;
pub use error::Result;
pub use error::RunConfigError;
pub use identity::RandomTaskIds;
pub use identity::StableTaskIds;
pub use identity::TaskIdGenerator;
pub use larch_ci_core::Config;
pub use larch_ci_core::RunConfig;
