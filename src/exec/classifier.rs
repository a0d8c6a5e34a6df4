use crate::exec::{ExecutionError, ExecutionEvent, OutcomeStatus};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One recorded task outcome for one host.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub playbook: String,
    pub task_name: String,
    pub task_action: String,
    pub host: String,
    pub host_address: String,
    /// Result payload with engine bookkeeping keys stripped.
    pub result_data: Value,
    pub changed: bool,
}

/// Per-host accumulation of task results for a single module's execution.
/// Owned by the orchestrator for that module only and discarded once the
/// module completes; results of interest are consumed inline.
#[derive(Debug, Default)]
pub struct RunReport {
    module: String,
    hosts: BTreeMap<String, Vec<TaskResult>>,
}

impl RunReport {
    pub fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            hosts: BTreeMap::new(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn record(&mut self, result: TaskResult) {
        self.hosts.entry(result.host.clone()).or_default().push(result);
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(|h| h.as_str())
    }

    pub fn results_for(&self, host: &str) -> &[TaskResult] {
        self.hosts.get(host).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn task_count(&self) -> usize {
        self.hosts.values().map(Vec::len).sum()
    }

    pub fn changed_count(&self) -> usize {
        self.hosts
            .values()
            .flatten()
            .filter(|result| result.changed)
            .count()
    }
}

/// Consumes one module's event stream in emission order and builds its run
/// report.
///
/// Fail-fast: the first failed or unreachable host outcome returns an
/// attributed [`ExecutionError::ModuleRun`] and no further events are
/// consumed. After a fully successful stream, a nonzero engine exit status
/// still fails the module with the distinct
/// [`ExecutionError::Unexplained`] variant, since the engine contradicted its
/// own stream.
pub fn classify(
    module: &str,
    events: impl IntoIterator<Item = ExecutionEvent>,
    exit_code: i32,
) -> Result<RunReport, ExecutionError> {
    let mut report = RunReport::new(module);
    let mut last_context: Option<String> = None;

    for event in events {
        match event {
            ExecutionEvent::TaskStart { task_name } => {
                debug!(module, task = %task_name, "task started");
                last_context = Some(format!("task '{task_name}'"));
            }
            ExecutionEvent::RunSummary => {
                debug!(module, "play recap received");
                last_context = Some("play recap".to_string());
            }
            ExecutionEvent::HostOutcome(outcome) if outcome.status == OutcomeStatus::Ok => {
                let (result_data, changed) = outcome.cleaned_result();
                last_context = Some(format!(
                    "task '{}' on host {}",
                    outcome.task_name, outcome.host
                ));
                report.record(TaskResult {
                    playbook: outcome.playbook,
                    task_name: outcome.task_name,
                    task_action: outcome.task_action,
                    host: outcome.host,
                    host_address: outcome.host_address,
                    result_data,
                    changed,
                });
            }
            ExecutionEvent::HostOutcome(outcome) => {
                return Err(ExecutionError::ModuleRun {
                    module: module.to_string(),
                    task_name: outcome.task_name,
                    task_action: outcome.task_action,
                    host: outcome.host,
                    host_address: outcome.host_address,
                    detail: outcome.result.to_string(),
                });
            }
            ExecutionEvent::Warning(text) => match &last_context {
                Some(context) => warn!(module, "warning after {context}: {text}"),
                None => warn!(module, "unattributed warning: {text}"),
            },
            ExecutionEvent::Ignored => {}
        }
    }

    if exit_code != 0 {
        return Err(ExecutionError::Unexplained {
            module: module.to_string(),
            exit_code,
        });
    }

    Ok(report)
}
