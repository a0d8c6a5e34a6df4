use crate::catalog::ModuleCatalog;
use crate::exec::{
    classify, AutomationEngine, EngineJob, ExecutionError, InventoryRef, RenderedPlaybook,
    RoleNamespace,
};
use std::collections::BTreeMap;
use tracing::{error, info};

/// Walks the deployment order and drives the engine through each module,
/// strictly sequentially. The first failing module aborts every module after
/// it; completed modules' effects are left as-is, no rollback.
pub struct DeploymentOrchestrator<'a, E: AutomationEngine> {
    catalog: &'a ModuleCatalog,
    engine: &'a E,
    inventory: InventoryRef,
}

impl<'a, E: AutomationEngine> DeploymentOrchestrator<'a, E> {
    /// `inventory` is the shared generated inventory used whenever a module's
    /// playbook targets anything beyond localhost.
    pub fn new(catalog: &'a ModuleCatalog, engine: &'a E, inventory: InventoryRef) -> Self {
        Self {
            catalog,
            engine,
            inventory,
        }
    }

    /// Deploys every module in `order` with one shared role namespace, built
    /// before the first module executes.
    pub async fn deploy_all(
        &self,
        order: &[String],
        variables: &BTreeMap<String, serde_yaml::Value>,
    ) -> Result<(), ExecutionError> {
        let namespace = RoleNamespace::build(self.catalog, order)?;
        info!(
            modules = order.len(),
            roles = namespace.len(),
            "starting deployment"
        );
        for module in order {
            if let Err(err) = self.run_module(module, &namespace, variables).await {
                error!(module = %module, "deployment aborted: {err}");
                return Err(err);
            }
        }
        info!("deployment complete");
        Ok(())
    }

    /// Deploys a single module, with a namespace built from that module
    /// alone.
    pub async fn deploy_module(
        &self,
        module: &str,
        variables: &BTreeMap<String, serde_yaml::Value>,
    ) -> Result<(), ExecutionError> {
        let namespace = RoleNamespace::build(self.catalog, &[module.to_string()])?;
        self.run_module(module, &namespace, variables).await
    }

    async fn run_module(
        &self,
        module: &str,
        namespace: &RoleNamespace,
        variables: &BTreeMap<String, serde_yaml::Value>,
    ) -> Result<(), ExecutionError> {
        info!(module, "deploying module");

        let mut playbook = RenderedPlaybook::load(&self.catalog.playbook_path(module))?;
        playbook.inject_vars(variables);

        let inventory = if playbook.localhost_only() {
            InventoryRef::None
        } else {
            self.inventory.clone()
        };

        let job = EngineJob {
            module: module.to_string(),
            playbook_yaml: playbook.to_yaml().map_err(|e| ExecutionError::Render {
                module: module.to_string(),
                reason: e.to_string(),
            })?,
            inventory,
            roles_search_path: namespace.search_path(),
        };

        let outcome = self.engine.run(&job).await?;
        let report = classify(module, outcome.events, outcome.exit_code)?;
        info!(
            module,
            hosts = report.hosts().count(),
            tasks = report.task_count(),
            changed = report.changed_count(),
            "module deployed"
        );
        Ok(())
    }
}
