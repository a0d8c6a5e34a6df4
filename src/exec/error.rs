use crate::catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A module run failed. Carries the classifier's attributed diagnostic:
    /// module, task, action, host, address, and the raw failure text.
    #[error(
        "Module '{module}' failed: task '{task_name}' ({task_action}) \
         on host {host} ({host_address}): {detail}"
    )]
    ModuleRun {
        module: String,
        task_name: String,
        task_action: String,
        host: String,
        host_address: String,
        detail: String,
    },

    /// The engine exited nonzero but its event stream reported no failed or
    /// unreachable host. The mismatch between exit status and stream needs
    /// manual investigation; fabricating task context here would mislead.
    #[error(
        "Module '{module}' engine exited with status {exit_code} but its event \
         stream contained no failed or unreachable host; inspect the engine \
         output manually"
    )]
    Unexplained { module: String, exit_code: i32 },

    #[error("Failed to render playbook for module '{module}': {reason}")]
    Render { module: String, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Automation engine executable '{name}' not found on PATH")]
    NotFound { name: String },

    #[error("Failed to launch automation engine: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage playbook for the engine: {source}")]
    Staging {
        #[source]
        source: std::io::Error,
    },
}
