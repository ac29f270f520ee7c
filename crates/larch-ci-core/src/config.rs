//! User-facing pipeline configuration types.
//!
//! These types describe the declarative pipeline tree as produced by the
//! upstream parser. The parser owns schema validation (required fields, enum
//! values); the compiler trusts the shape and only checks cross-references.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// A parsed user configuration: named pipelines plus the task and runtime
/// templates they reference.
///
/// Names are unique within each map; the parser rejects duplicates before
/// the compiler ever sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pipelines keyed by pipeline name.
    #[serde(default)]
    pub pipelines: HashMap<String, Pipeline>,
    /// Task templates keyed by task name.
    #[serde(default)]
    pub tasks: HashMap<String, TaskTemplate>,
    /// Runtime templates keyed by runtime name.
    #[serde(default)]
    pub runtimes: HashMap<String, RuntimeTemplate>,
}

/// A named pipeline: an unordered collection of elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline name.
    pub name: String,
    /// Elements keyed by element name.
    #[serde(default)]
    pub elements: HashMap<String, Element>,
}

/// One node in a pipeline.
///
/// An element references exactly one task template by name and declares its
/// dependencies on other elements of the same pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element name (becomes the compiled task's name).
    pub name: String,
    /// Name of the referenced task template.
    pub task: String,
    /// Ordered dependency edges on other elements.
    #[serde(default)]
    pub depends: Vec<Depend>,
    /// Whether a failure of this element is ignored by downstream gating.
    #[serde(default)]
    pub ignore_failure: bool,
    /// Whether this element requires manual approval before running.
    #[serde(default)]
    pub approval: bool,
    /// Optional predicate gating execution on the trigger context.
    #[serde(default)]
    pub when: Option<When>,
}

/// A dependency edge from an element to a prerequisite element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depend {
    /// Name of the prerequisite element.
    pub element: String,
    /// Conditions under which the edge is considered satisfied.
    ///
    /// Empty means the default (the prerequisite finished successfully).
    #[serde(default)]
    pub conditions: Vec<DependCondition>,
}

/// Per-edge dependency condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependCondition {
    /// Satisfied when the prerequisite succeeded.
    OnSuccess,
    /// Satisfied when the prerequisite failed.
    OnFailure,
    /// Satisfied when the prerequisite was skipped.
    OnSkipped,
}

/// A reusable task fragment referenced by elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Task template name.
    pub name: String,
    /// Name of the referenced runtime template.
    pub runtime: String,
    /// Task-scoped environment.
    #[serde(default)]
    pub environment: HashMap<String, EnvVar>,
    /// Default working directory for steps.
    #[serde(default)]
    pub working_dir: String,
    /// Shell used by run steps.
    #[serde(default)]
    pub shell: String,
    /// User the steps run as.
    #[serde(default)]
    pub user: String,
    /// Ordered step sequence.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A reusable runtime fragment describing where a task executes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeTemplate {
    /// Runtime template name.
    pub name: String,
    /// Runtime kind.
    #[serde(default)]
    pub kind: RuntimeKind,
    /// Target architecture (empty means any).
    #[serde(default)]
    pub arch: String,
    /// Runtime-scoped environment, merged under each container's own.
    #[serde(default)]
    pub environment: HashMap<String, EnvVar>,
    /// Ordered containers; the first is the main container.
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// Kind of execution runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeKind {
    /// A pod of one or more containers.
    #[default]
    Pod,
}

/// A container within a runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Container image.
    pub image: String,
    /// User the container runs as.
    #[serde(default)]
    pub user: String,
    /// Container-scoped environment, overriding the runtime scope on
    /// key collision.
    #[serde(default)]
    pub environment: HashMap<String, EnvVar>,
}

/// An environment value: either a literal string or a reference to a named
/// variable resolved at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum EnvVar {
    /// The value is used verbatim.
    Literal(String),
    /// The value is looked up in the variables table by name.
    ///
    /// A missing variable resolves to the empty string; downstream steps
    /// decide whether that is significant.
    FromVariable(String),
}

/// A pipeline step.
///
/// Only `run` steps carry compile-time semantics (environment resolution);
/// every other kind is carried through to the scheduler untouched. Step
/// kinds this crate does not know about land in [`Step::Opaque`].
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

/// A `run` step before environment resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStep {
    /// Display name; defaults to the command when empty.
    #[serde(default)]
    pub name: String,
    /// Command line to execute.
    pub command: String,
    /// Step-scoped environment.
    #[serde(default)]
    pub environment: HashMap<String, EnvVar>,
}

/// A `save-cache` step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCacheStep {
    /// Cache key template.
    pub key: String,
    /// Paths to store under the key.
    #[serde(default)]
    pub contents: Vec<String>,
}

/// A `restore-cache` step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreCacheStep {
    /// Cache key templates tried in order.
    pub keys: Vec<String>,
    /// Directory the cache content is restored into.
    #[serde(default)]
    pub dest_dir: String,
}

/// Predicate gating an element on the trigger context.
///
/// Every condition that is present must match its context value for the
/// element to be active; a condition whose context value is absent does not
/// match (a branch-only build cannot satisfy a tag rule).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct When {
    /// Condition on the branch name.
    #[serde(default)]
    pub branch: Option<WhenConditions>,
    /// Condition on the tag name.
    #[serde(default)]
    pub tag: Option<WhenConditions>,
    /// Condition on the full ref.
    #[serde(default, rename = "ref")]
    pub ref_name: Option<WhenConditions>,
}

/// An include/exclude pair of conditions.
///
/// The pair matches when the include list is empty or any include entry
/// matches, and no exclude entry matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenConditions {
    /// Entries that admit a context value.
    #[serde(default)]
    pub include: Vec<WhenCondition>,
    /// Entries that veto a context value, overriding any include.
    #[serde(default)]
    pub exclude: Vec<WhenCondition>,
}

/// A single condition entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenCondition {
    /// The pattern to compare the context value against.
    #[serde(rename = "match")]
    pub pattern: String,
    /// How the pattern is interpreted.
    #[serde(default)]
    pub kind: WhenConditionKind,
}

/// Interpretation of a [`WhenCondition`] pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhenConditionKind {
    /// Exact string equality.
    #[default]
    Literal,
    /// Anchored regular-expression match.
    Regexp,
}
