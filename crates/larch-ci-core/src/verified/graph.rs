//! Pure dependency-graph analysis over a run-configuration task map.
//!
//! Tasks reference their parents by ID, so the graph carries no cyclic
//! ownership; every function here takes the task map plus borrowed tasks.
//! "Parents" are the tasks a given task depends on.

use std::collections::HashMap;
use std::collections::HashSet;

use snafu::OptionExt;

use crate::error::CancelledSnafu;
use crate::error::CircularDependencySnafu;
use crate::error::Result;
use crate::error::UnknownDependencySnafu;
use crate::run::RunConfigTask;
use crate::run::LEVEL_UNASSIGNED;

/// Assign a scheduling level to every task.
///
/// Roots get level 0; every other task gets one more than its highest
/// parent. Levels are computed by bounded relaxation: no acyclic graph
/// needs more than one pass per task to settle, so a task still unassigned
/// after `len + 1` passes proves a cycle.
///
/// Fails with [`CoreError::CircularDependency`] on a cycle and
/// [`CoreError::UnknownDependency`] when an edge points outside the map.
///
/// [`CoreError::CircularDependency`]: crate::error::CoreError::CircularDependency
/// [`CoreError::UnknownDependency`]: crate::error::CoreError::UnknownDependency
pub fn gen_tasks_levels(tasks: &mut HashMap<String, RunConfigTask>) -> Result<()> {
    gen_tasks_levels_with_cancel(tasks, || false)
}

/// [`gen_tasks_levels`] with a cancellation probe.
///
/// The probe is consulted at the start of every pass; a `true` return
/// aborts the analysis with [`CoreError::Cancelled`], leaving levels in an
/// unspecified state. The compiler wires its caller's cancellation token
/// through here.
///
/// [`CoreError::Cancelled`]: crate::error::CoreError::Cancelled
pub fn gen_tasks_levels_with_cancel(
    tasks: &mut HashMap<String, RunConfigTask>,
    mut cancelled: impl FnMut() -> bool,
) -> Result<()> {
    for task in tasks.values_mut() {
        task.level = LEVEL_UNASSIGNED;
    }

    for _ in 0..=tasks.len() {
        if cancelled() {
            return CancelledSnafu.fail();
        }
        let mut assigned: Vec<(String, i32)> = Vec::new();

        for (key, task) in tasks.iter() {
            if task.level >= 0 {
                continue;
            }

            let mut level = 0;
            let mut ready = true;
            for depend in &task.depends {
                let parent = tasks.get(&depend.task_id).context(UnknownDependencySnafu {
                    task_id: task.id.clone(),
                    depend_id: depend.task_id.clone(),
                })?;
                if parent.level < 0 {
                    ready = false;
                    break;
                }
                level = level.max(parent.level + 1);
            }
            if ready {
                assigned.push((key.clone(), level));
            }
        }

        // Fixed point: either everything is levelled or the remainder is
        // on a cycle.
        if assigned.is_empty() {
            break;
        }
        for (key, level) in assigned {
            if let Some(task) = tasks.get_mut(&key) {
                task.level = level;
            }
        }
    }

    if tasks.values().any(|task| task.level < 0) {
        return CircularDependencySnafu.fail();
    }
    Ok(())
}

/// Return a task's direct parents.
///
/// Edges whose target is absent from the map are skipped; the validator
/// reports them separately.
pub fn get_parents<'a>(
    tasks: &'a HashMap<String, RunConfigTask>,
    task: &RunConfigTask,
) -> Vec<&'a RunConfigTask> {
    task.depends.iter().filter_map(|depend| tasks.get(&depend.task_id)).collect()
}

/// Return every task transitively reachable through a task's depends.
///
/// The walk deduplicates revisited tasks but never pre-seeds the start
/// task, so a task lying on a cycle appears in its own parent set. The
/// validator relies on exactly this to localize cycles; do not exclude the
/// start task unconditionally.
pub fn get_all_parents<'a>(
    tasks: &'a HashMap<String, RunConfigTask>,
    task: &RunConfigTask,
) -> Vec<&'a RunConfigTask> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut parents: Vec<&RunConfigTask> = Vec::new();
    let mut frontier = get_parents(tasks, task);

    while let Some(parent) = frontier.pop() {
        if !seen.insert(parent.id.as_str()) {
            continue;
        }
        parents.push(parent);
        frontier.extend(get_parents(tasks, parent));
    }

    parents
}
