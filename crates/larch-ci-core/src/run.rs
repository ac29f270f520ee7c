//! Compiled run-configuration types.
//!
//! A [`RunConfig`] is the frozen contract handed to the scheduler: a DAG of
//! fully resolved tasks with every environment value bound to a string and
//! every dependency edge expressed by task ID. After the compiler emits it,
//! nothing mutates it; consumers may read it from multiple threads freely.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::config::DependCondition;
use crate::config::RestoreCacheStep;
use crate::config::RuntimeKind;
use crate::config::SaveCacheStep;

/// Level value meaning "not yet assigned".
///
/// Level assignment replaces it with the task's 0-based wave index; a value
/// still negative afterwards indicates a cycle.
pub const LEVEL_UNASSIGNED: i32 = -1;

/// The compiled, immutable task graph for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Name of the source pipeline.
    pub name: String,
    /// Resolved global environment.
    pub environment: HashMap<String, String>,
    /// Tasks keyed by task ID.
    pub tasks: HashMap<String, RunConfigTask>,
}

/// One executable task in a run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfigTask {
    /// Stable unique ID, deterministic per element name within a compilation.
    pub id: String,
    /// Task name (the source element name).
    pub name: String,
    /// 0-based scheduling wave, [`LEVEL_UNASSIGNED`] until levels are
    /// generated.
    pub level: i32,
    /// Dependency edges by target task ID.
    pub depends: Vec<RunConfigTaskDepend>,
    /// Fully resolved runtime.
    pub runtime: Runtime,
    /// Resolved task-scoped environment.
    pub environment: HashMap<String, String>,
    /// Working directory for steps.
    pub working_dir: String,
    /// Shell used by run steps.
    pub shell: String,
    /// User the steps run as.
    pub user: String,
    /// Resolved step sequence.
    pub steps: Vec<Step>,
    /// Whether the task is retained but skipped by `when` gating.
    pub skip: bool,
    /// Whether a failure of this task is ignored by downstream gating.
    pub ignore_failure: bool,
    /// Whether the task awaits manual approval before dispatch.
    pub needs_approval: bool,
}

/// A resolved dependency edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfigTaskDepend {
    /// ID of the prerequisite task within the same run config.
    pub task_id: String,
    /// Conditions carried over from the source element edge.
    #[serde(default)]
    pub conditions: Vec<DependCondition>,
}

/// A resolved runtime: the template with every environment value bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    /// Runtime kind.
    pub kind: RuntimeKind,
    /// Target architecture (empty means any).
    pub arch: String,
    /// Resolved containers.
    pub containers: Vec<Container>,
}

/// A resolved container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Container image.
    pub image: String,
    /// User the container runs as.
    pub user: String,
    /// Resolved container environment (runtime scope overridden by the
    /// container's own).
    pub environment: HashMap<String, String>,
}

/// A resolved pipeline step.
///
/// Mirrors [`crate::config::Step`] with run-step environments bound to
/// strings; cache and opaque steps pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Step {
    /// Run a command inside the task's runtime.
    Run(RunStep),
    /// Save paths into the shared cache.
    SaveCache(SaveCacheStep),
    /// Restore the first matching cache entry.
    RestoreCache(RestoreCacheStep),
    /// A step kind unknown to the compiler, passed through verbatim.
    #[serde(untagged)]
    Opaque(serde_json::Value),
}

/// A `run` step with its environment resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    /// Display name.
    pub name: String,
    /// Command line to execute.
    pub command: String,
    /// Resolved step-scoped environment.
    pub environment: HashMap<String, String>,
}
