//! Post-compilation structural validation.
//!
//! Every rule is checked for every task and all failures are collected
//! into one [`CheckErrors`] report, so users see the full picture in a
//! single pass. Diagnostics are ordered by task name for reproducibility.

use std::fmt;

use larch_ci_core::config::RuntimeKind;
use larch_ci_core::run::RunConfig;
use larch_ci_core::run::RunConfigTask;
use larch_ci_core::run::Step;
use larch_ci_core::verified::get_all_parents;
use snafu::Snafu;

/// Render task names the way diagnostics quote them.
fn quoted(names: &[String]) -> String {
    names.iter().map(|name| format!("{name:?}")).collect::<Vec<_>>().join(", ")
}

/// A single structural problem found in a compiled run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CheckError {
    /// The task sits on a dependency cycle.
    #[snafu(display("circular dependency between task {task:?} and tasks {}", quoted(through)))]
    CircularDependency {
        /// Name of the task on the cycle.
        task: String,
        /// Cycle members that depend on the task directly.
        through: Vec<String>,
    },

    /// A dependency edge points at a task ID absent from the run config.
    #[snafu(display("task {task:?} depends on unknown task {depend_id:?}"))]
    UnknownDependency {
        /// Name of the task carrying the edge.
        task: String,
        /// The missing target ID.
        depend_id: String,
    },

    /// A pod runtime has no containers to run in.
    #[snafu(display("task {task:?} runtime has no containers"))]
    EmptyRuntime {
        /// Name of the offending task.
        task: String,
    },

    /// A run step has nothing to execute.
    #[snafu(display("task {task:?} run step {index} has an empty command"))]
    EmptyCommand {
        /// Name of the offending task.
        task: String,
        /// Zero-based position of the step in the task.
        index: usize,
    },
}

/// The aggregated validation report: every problem found, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckErrors {
    errors: Vec<CheckError>,
}

impl CheckErrors {
    fn push(&mut self, error: CheckError) {
        self.errors.push(error);
    }

    /// The collected problems, ordered by task name within each rule.
    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    /// Number of problems in the report.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), CheckErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for CheckErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckErrors {}

/// Validate a compiled run configuration.
///
/// Rules:
/// - every task on a cycle gets one diagnostic naming the cycle members
///   that depend on it directly;
/// - every dependency edge must target a task in the same run config;
/// - pod runtimes need at least one container;
/// - run steps need a non-empty command.
///
/// Missing variables are not validator errors; they already resolved to
/// empty strings during compilation.
pub fn check_run_config(run_config: &RunConfig) -> Result<(), CheckErrors> {
    let mut report = CheckErrors::default();

    let mut tasks: Vec<&RunConfigTask> = run_config.tasks.values().collect();
    tasks.sort_by(|a, b| a.name.cmp(&b.name));

    // A task is on a cycle exactly when it shows up in its own transitive
    // parent set.
    for task in &tasks {
        let parents = get_all_parents(&run_config.tasks, task);
        if !parents.iter().any(|parent| parent.id == task.id) {
            continue;
        }
        let mut through: Vec<String> = parents
            .iter()
            .filter(|parent| parent.depends.iter().any(|depend| depend.task_id == task.id))
            .map(|parent| parent.name.clone())
            .collect();
        through.sort();
        report.push(CheckError::CircularDependency { task: task.name.clone(), through });
    }

    for task in &tasks {
        for depend in &task.depends {
            if !run_config.tasks.contains_key(&depend.task_id) {
                report.push(CheckError::UnknownDependency {
                    task: task.name.clone(),
                    depend_id: depend.task_id.clone(),
                });
            }
        }

        match task.runtime.kind {
            RuntimeKind::Pod => {
                if task.runtime.containers.is_empty() {
                    report.push(CheckError::EmptyRuntime { task: task.name.clone() });
                }
            }
        }

        for (index, step) in task.steps.iter().enumerate() {
            if let Step::Run(run_step) = step {
                if run_step.command.is_empty() {
                    report.push(CheckError::EmptyCommand { task: task.name.clone(), index });
                }
            }
        }
    }

    report.into_result()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use larch_ci_core::run::Container;
    use larch_ci_core::run::RunConfigTaskDepend;
    use larch_ci_core::run::RunStep;
    use larch_ci_core::run::Runtime;
    use larch_ci_core::LEVEL_UNASSIGNED;

    use super::*;

    /// Build a run config whose tasks have one container and no steps.
    fn run_config(tasks: &[(&str, &[&str])]) -> RunConfig {
        RunConfig {
            name: "pipeline01".to_string(),
            environment: HashMap::new(),
            tasks: tasks
                .iter()
                .map(|(id, depends)| {
                    let task = RunConfigTask {
                        id: id.to_string(),
                        name: format!("task{id}"),
                        level: LEVEL_UNASSIGNED,
                        depends: depends
                            .iter()
                            .map(|target| RunConfigTaskDepend {
                                task_id: target.to_string(),
                                conditions: vec![],
                            })
                            .collect(),
                        runtime: Runtime {
                            containers: vec![Container::default()],
                            ..Default::default()
                        },
                        environment: HashMap::new(),
                        working_dir: String::new(),
                        shell: String::new(),
                        user: String::new(),
                        steps: vec![],
                        skip: false,
                        ignore_failure: false,
                        needs_approval: false,
                    };
                    (id.to_string(), task)
                })
                .collect(),
        }
    }

    fn messages(report: &CheckErrors) -> Vec<String> {
        report.errors().iter().map(|error| error.to_string()).collect()
    }

    // ========================================================================
    // cycle diagnostics
    // ========================================================================

    #[test]
    fn test_acyclic_graphs_pass() {
        assert!(check_run_config(&run_config(&[("1", &[])])).is_ok());
        assert!(check_run_config(&run_config(&[("1", &[]), ("2", &[])])).is_ok());
        assert!(check_run_config(&run_config(&[("1", &[]), ("2", &["1"])])).is_ok());
    }

    #[test]
    fn test_two_task_cycle() {
        let report = check_run_config(&run_config(&[("1", &["2"]), ("2", &["1"])])).unwrap_err();
        assert_eq!(
            messages(&report),
            [
                "circular dependency between task \"task1\" and tasks \"task2\"",
                "circular dependency between task \"task2\" and tasks \"task1\"",
            ]
        );
    }

    #[test]
    fn test_three_task_cycle() {
        let report =
            check_run_config(&run_config(&[("1", &["2"]), ("2", &["3"]), ("3", &["1"])]))
                .unwrap_err();
        assert_eq!(
            messages(&report),
            [
                "circular dependency between task \"task1\" and tasks \"task3\"",
                "circular dependency between task \"task2\" and tasks \"task1\"",
                "circular dependency between task \"task3\" and tasks \"task2\"",
            ]
        );
    }

    #[test]
    fn test_partial_cycle_spares_the_upstream_task() {
        // 1 -> 2 -> 3 -> 2: only tasks 2 and 3 are on the cycle.
        let report =
            check_run_config(&run_config(&[("1", &["2"]), ("2", &["3"]), ("3", &["2"])]))
                .unwrap_err();
        assert_eq!(
            messages(&report),
            [
                "circular dependency between task \"task2\" and tasks \"task3\"",
                "circular dependency between task \"task3\" and tasks \"task2\"",
            ]
        );
    }

    #[test]
    fn test_self_dependency() {
        let report = check_run_config(&run_config(&[("1", &["1"])])).unwrap_err();
        assert_eq!(
            messages(&report),
            ["circular dependency between task \"task1\" and tasks \"task1\""]
        );
    }

    // ========================================================================
    // reference, runtime and step rules
    // ========================================================================

    #[test]
    fn test_unknown_dependency() {
        let report = check_run_config(&run_config(&[("1", &["ghost"])])).unwrap_err();
        assert_eq!(messages(&report), ["task \"task1\" depends on unknown task \"ghost\""]);
    }

    #[test]
    fn test_empty_runtime() {
        let mut rc = run_config(&[("1", &[])]);
        rc.tasks.get_mut("1").unwrap().runtime.containers.clear();

        let report = check_run_config(&rc).unwrap_err();
        assert_eq!(messages(&report), ["task \"task1\" runtime has no containers"]);
    }

    #[test]
    fn test_empty_run_command() {
        let mut rc = run_config(&[("1", &[])]);
        rc.tasks.get_mut("1").unwrap().steps = vec![
            Step::Run(RunStep {
                name: "ok".to_string(),
                command: "make".to_string(),
                environment: HashMap::new(),
            }),
            Step::Run(RunStep::default()),
        ];

        let report = check_run_config(&rc).unwrap_err();
        assert_eq!(messages(&report), ["task \"task1\" run step 1 has an empty command"]);
    }

    #[test]
    fn test_failures_are_collected_not_short_circuited() {
        // A cycle, a dangling edge and an empty runtime all reported at once.
        let mut rc = run_config(&[("1", &["2"]), ("2", &["1"]), ("3", &["ghost"])]);
        rc.tasks.get_mut("3").unwrap().runtime.containers.clear();

        let report = check_run_config(&rc).unwrap_err();
        assert_eq!(
            messages(&report),
            [
                "circular dependency between task \"task1\" and tasks \"task2\"",
                "circular dependency between task \"task2\" and tasks \"task1\"",
                "task \"task3\" depends on unknown task \"ghost\"",
                "task \"task3\" runtime has no containers",
            ]
        );
    }
}
