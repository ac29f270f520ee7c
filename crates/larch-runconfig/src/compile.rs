//! Run-configuration generation.
//!
//! This is the single place where the user's declarative pipeline meets the
//! scheduler's operational contract: the compiler fixes the DAG shape, the
//! scheduling waves, the environment bindings and the skip decisions, and
//! everything downstream treats the result as frozen.

use std::collections::HashMap;

use larch_ci_core::config;
use larch_ci_core::run;
use larch_ci_core::verified::gen_tasks_levels_with_cancel;
use larch_ci_core::verified::match_when;
use larch_ci_core::verified::merge_env;
use larch_ci_core::verified::resolve_env;
use larch_ci_core::CoreError;
use larch_ci_core::LEVEL_UNASSIGNED;
use serde::Deserialize;
use serde::Serialize;
use snafu::OptionExt;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::check::check_run_config;
use crate::error::CancelledSnafu;
use crate::error::InvalidWhenConditionSnafu;
use crate::error::PipelineNotFoundSnafu;
use crate::error::Result;
use crate::error::RunConfigError;
use crate::error::UnknownDependElementSnafu;
use crate::error::UnknownRuntimeSnafu;
use crate::error::UnknownTaskSnafu;
use crate::identity::TaskIdGenerator;

/// Facts about the event that initiated a pipeline run.
///
/// Each value is optional: a branch push carries no tag, a tag push no
/// branch. `when` predicates are evaluated against exactly these values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerContext {
    /// Branch name, when the trigger was a branch update.
    pub branch: Option<String>,
    /// Tag name, when the trigger was a tag.
    pub tag: Option<String>,
    /// Full ref of the trigger.
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
}

/// Compile a named pipeline into a run configuration.
///
/// Looks up `pipeline_name` in `config`, materializes one task per element
/// with its runtime, environment and steps fully resolved against
/// `variables`, translates dependency edges to task IDs, gates each task on
/// `trigger` via its `when` predicate, assigns scheduling levels and
/// validates the result. Skipped tasks stay in the graph with their edges;
/// an empty pipeline compiles to an empty (valid) run configuration.
///
/// `cancel` is observed between elements and at the start of every level
/// pass; a cancelled compilation returns [`RunConfigError::Cancelled`] and
/// no partial output. Compilation is a pure function of its inputs: with a
/// deterministic `id_gen`, identical inputs yield identical output.
pub fn gen_run_config(
    id_gen: &dyn TaskIdGenerator,
    config: &config::Config,
    pipeline_name: &str,
    env: &HashMap<String, config::EnvVar>,
    variables: &HashMap<String, String>,
    trigger: &TriggerContext,
    cancel: &CancellationToken,
) -> Result<run::RunConfig> {
    let pipeline = config
        .pipelines
        .get(pipeline_name)
        .context(PipelineNotFoundSnafu { name: pipeline_name })?;

    let environment = resolve_env(env, variables);

    // Mint every ID up front so depend edges can be translated regardless
    // of element iteration order.
    let ids: HashMap<&str, String> =
        pipeline.elements.keys().map(|name| (name.as_str(), id_gen.task_id(name))).collect();

    let mut tasks = HashMap::with_capacity(pipeline.elements.len());
    for (name, element) in &pipeline.elements {
        if cancel.is_cancelled() {
            return CancelledSnafu.fail();
        }

        let id = ids[name.as_str()].clone();
        let task = compile_element(config, id, element, &ids, variables, trigger)?;
        debug!(element = %name, task_id = %task.id, skip = task.skip, "compiled element");
        tasks.insert(task.id.clone(), task);
    }

    gen_tasks_levels_with_cancel(&mut tasks, || cancel.is_cancelled()).map_err(
        |source| match source {
            CoreError::Cancelled => RunConfigError::Cancelled,
            source => RunConfigError::Levels { source },
        },
    )?;

    let run_config = run::RunConfig { name: pipeline.name.clone(), environment, tasks };
    check_run_config(&run_config).map_err(|errors| RunConfigError::Validation { errors })?;

    info!(pipeline = %run_config.name, tasks = run_config.tasks.len(), "generated run config");
    Ok(run_config)
}

/// Materialize one element into a task with everything resolved.
fn compile_element(
    config: &config::Config,
    id: String,
    element: &config::Element,
    ids: &HashMap<&str, String>,
    variables: &HashMap<String, String>,
    trigger: &TriggerContext,
) -> Result<run::RunConfigTask> {
    let task_template = config.tasks.get(&element.task).context(UnknownTaskSnafu {
        element: element.name.clone(),
        task: element.task.clone(),
    })?;
    let runtime_template =
        config.runtimes.get(&task_template.runtime).context(UnknownRuntimeSnafu {
            task: task_template.name.clone(),
            runtime: task_template.runtime.clone(),
        })?;

    // The runtime scope seeds every container; the container's own scope
    // wins on key collision.
    let runtime_env = resolve_env(&runtime_template.environment, variables);
    let containers = runtime_template
        .containers
        .iter()
        .map(|container| run::Container {
            image: container.image.clone(),
            user: container.user.clone(),
            environment: merge_env(&runtime_env, &resolve_env(&container.environment, variables)),
        })
        .collect();

    let steps = task_template.steps.iter().map(|step| compile_step(step, variables)).collect();

    let depends = element
        .depends
        .iter()
        .map(|depend| {
            let task_id = ids.get(depend.element.as_str()).context(UnknownDependElementSnafu {
                element: element.name.clone(),
                depend: depend.element.clone(),
            })?;
            Ok(run::RunConfigTaskDepend {
                task_id: task_id.clone(),
                conditions: depend.conditions.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let active = match_when(
        element.when.as_ref(),
        trigger.branch.as_deref(),
        trigger.tag.as_deref(),
        trigger.ref_name.as_deref(),
    )
    .context(InvalidWhenConditionSnafu { element: element.name.clone() })?;

    Ok(run::RunConfigTask {
        id,
        name: element.name.clone(),
        level: LEVEL_UNASSIGNED,
        depends,
        runtime: run::Runtime {
            kind: runtime_template.kind,
            arch: runtime_template.arch.clone(),
            containers,
        },
        environment: resolve_env(&task_template.environment, variables),
        working_dir: task_template.working_dir.clone(),
        shell: task_template.shell.clone(),
        user: task_template.user.clone(),
        steps,
        skip: !active,
        ignore_failure: element.ignore_failure,
        needs_approval: element.approval,
    })
}

/// Resolve one step; non-run kinds pass through untouched.
fn compile_step(step: &config::Step, variables: &HashMap<String, String>) -> run::Step {
    match step {
        config::Step::Run(run_step) => {
            // A nameless run step is displayed by its command.
            let name = if run_step.name.is_empty() {
                run_step.command.clone()
            } else {
                run_step.name.clone()
            };
            run::Step::Run(run::RunStep {
                name,
                command: run_step.command.clone(),
                environment: resolve_env(&run_step.environment, variables),
            })
        }
        config::Step::SaveCache(step) => run::Step::SaveCache(step.clone()),
        config::Step::RestoreCache(step) => run::Step::RestoreCache(step.clone()),
        config::Step::Opaque(value) => run::Step::Opaque(value.clone()),
    }
}
