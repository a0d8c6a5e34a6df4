use crate::exec::{EngineError, ExecutionEvent};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Inventory handed to the engine for one module run. `None` when every play
/// targets localhost, otherwise the shared generated inventory file.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InventoryRef {
    #[default]
    None,
    File(PathBuf),
}

/// One prepared engine invocation.
#[derive(Debug, Clone)]
pub struct EngineJob {
    pub module: String,
    pub playbook_yaml: String,
    pub inventory: InventoryRef,
    pub roles_search_path: Vec<PathBuf>,
}

/// Raw result of one engine invocation: the process exit status plus the
/// captured stdout stream, already split into one event per line.
#[derive(Debug)]
pub struct EngineOutcome {
    pub exit_code: i32,
    pub events: Vec<ExecutionEvent>,
}

/// Seam to the external automation engine. The engine executes playbooks
/// against hosts; this crate only invokes it, captures its event stream, and
/// interprets the result. One invocation blocks until the engine finishes;
/// there is no cancellation.
#[async_trait]
pub trait AutomationEngine {
    async fn run(&self, job: &EngineJob) -> Result<EngineOutcome, EngineError>;
}

/// ansible-runner compatible subprocess engine.
///
/// Stages the rendered playbook into a scratch directory and invokes
/// `ansible-runner run <dir> -p <playbook> --json`, whose stdout is a stream
/// of JSON event lines. The full stream and the exit status are collected
/// before classification, matching the engine's own json-mode contract.
pub struct RunnerEngine {
    program: PathBuf,
}

impl RunnerEngine {
    pub const DEFAULT_PROGRAM: &'static str = "ansible-runner";

    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Locates the default engine executable on PATH.
    pub fn discover() -> Result<Self, EngineError> {
        let program = which::which(Self::DEFAULT_PROGRAM).map_err(|_| EngineError::NotFound {
            name: Self::DEFAULT_PROGRAM.to_string(),
        })?;
        Ok(Self::new(program))
    }
}

#[async_trait]
impl AutomationEngine for RunnerEngine {
    async fn run(&self, job: &EngineJob) -> Result<EngineOutcome, EngineError> {
        let scratch = tempfile::Builder::new()
            .prefix("homelab-deploy-")
            .tempdir()
            .map_err(|e| EngineError::Staging { source: e })?;
        let project_dir = scratch.path().join("project");
        std::fs::create_dir_all(&project_dir).map_err(|e| EngineError::Staging { source: e })?;
        std::fs::write(project_dir.join("playbook.yaml"), &job.playbook_yaml)
            .map_err(|e| EngineError::Staging { source: e })?;

        let mut command = Command::new(&self.program);
        command
            .arg("run")
            .arg(scratch.path())
            .arg("-p")
            .arg("playbook.yaml")
            .arg("--json");
        if let InventoryRef::File(path) = &job.inventory {
            command.arg("--inventory").arg(path);
        }
        if !job.roles_search_path.is_empty() {
            let joined = std::env::join_paths(&job.roles_search_path)
                .unwrap_or_else(|_| OsString::new());
            command.env("ANSIBLE_ROLES_PATH", joined);
        }

        info!(module = %job.module, program = %self.program.display(), "invoking engine");
        let output = command
            .output()
            .await
            .map_err(|e| EngineError::Spawn { source: e })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let events: Vec<ExecutionEvent> = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ExecutionEvent::from_line)
            .collect();
        debug!(
            module = %job.module,
            exit_code,
            events = events.len(),
            "engine finished"
        );

        Ok(EngineOutcome { exit_code, events })
    }
}
