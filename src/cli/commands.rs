use crate::catalog::{CatalogError, ModuleCatalog};
use crate::config::{ConfigurationBinder, ConfigurationDocument, DocumentError, Selection};
use crate::exec::{AutomationEngine, DeploymentOrchestrator, ExecutionError, InventoryRef};
use crate::planner::{order_selection, DependencyResolver, PlanError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("No modules selected; add at least one entry to '{path}'")]
    EmptySelection { path: String },

    #[error("Selection contains invalid entries; see the annotations written to '{path}'")]
    InvalidSelection { path: String },

    #[error("Configuration is invalid; see the annotations written to '{path}'")]
    InvalidConfiguration { path: String },
}

/// All state one planning/execution pass needs: the loaded catalog plus the
/// operator-owned document locations. The graph and configuration document
/// are rebuilt from scratch inside each operation, never cached across runs.
pub struct DeployContext {
    pub catalog: ModuleCatalog,
    pub selection_path: PathBuf,
    pub configuration_path: PathBuf,
    pub inventory_path: Option<PathBuf>,
}

impl DeployContext {
    pub fn load(
        catalog_dir: PathBuf,
        selection_path: PathBuf,
        configuration_path: PathBuf,
        inventory_path: Option<PathBuf>,
    ) -> Result<Self, CatalogError> {
        let catalog = ModuleCatalog::load(catalog_dir)?;
        info!(modules = catalog.len(), "module catalog loaded");
        Ok(Self {
            catalog,
            selection_path,
            configuration_path,
            inventory_path,
        })
    }

    /// Rewrites the selection file's `available_modules` listing from the
    /// catalog, preserving the operator's `wanted_modules`.
    pub fn gather_available_modules(&self) -> Result<Selection, CommandError> {
        let mut selection = Selection::load_or_default(&self.selection_path)?;
        ConfigurationBinder::new(&self.catalog).refresh_available(&mut selection);
        selection.save(&self.selection_path)?;
        info!(
            available = selection.available_modules.len(),
            "selection file refreshed"
        );
        Ok(selection)
    }

    /// Annotates unknown `wanted_modules` entries in place and persists the
    /// result. Returns overall validity.
    pub fn validate_selection(&self) -> Result<bool, CommandError> {
        let mut selection = Selection::load(&self.selection_path)?;
        let valid = ConfigurationBinder::new(&self.catalog).validate_selection(&mut selection);
        selection.save(&self.selection_path)?;
        if !valid {
            warn!(path = %self.selection_path.display(), "selection has invalid entries");
        }
        Ok(valid)
    }

    /// Synthesizes configuration blocks for the full resolved selection, in
    /// deployment order so repeated runs produce identical documents.
    /// Blocks already present keep the operator's edits.
    pub fn build_configuration_template(&self) -> Result<ConfigurationDocument, CommandError> {
        let selection = self.checked_selection()?;
        let resolver = DependencyResolver::new(&self.catalog);
        let (graph, expanded) = resolver.resolve(&selection)?;
        let ordered = order_selection(&graph, &expanded);

        let mut document = ConfigurationDocument::load_or_default(&self.configuration_path)?;
        ConfigurationBinder::new(&self.catalog).synthesize(&mut document, &ordered)?;
        document.save(&self.configuration_path)?;
        info!(
            modules = document.modules.len(),
            path = %self.configuration_path.display(),
            "configuration template written"
        );
        Ok(document)
    }

    /// Validates the configuration document against the catalog, persisting
    /// the annotated document when anything is invalid.
    pub fn validate_configuration(&self) -> Result<bool, CommandError> {
        let mut document = ConfigurationDocument::load(&self.configuration_path)?;
        let valid = ConfigurationBinder::new(&self.catalog).validate(&mut document);
        if valid {
            // Idempotence: a valid document is not rewritten.
            return Ok(true);
        }
        document.save(&self.configuration_path)?;
        warn!(path = %self.configuration_path.display(), "configuration has invalid entries");
        Ok(false)
    }

    /// Plans and executes the deployment: resolve, order, validate, then
    /// drive the engine through every module (or just `only`) fail-fast.
    /// Planning and validation failures abort before anything runs.
    pub async fn deploy<E: AutomationEngine>(
        &self,
        engine: &E,
        only: Option<&str>,
    ) -> Result<(), CommandError> {
        let selection = self.checked_selection()?;
        let resolver = DependencyResolver::new(&self.catalog);
        let (graph, expanded) = resolver.resolve(&selection)?;
        let order = order_selection(&graph, &expanded);

        let mut document = ConfigurationDocument::load_or_default(&self.configuration_path)?;
        let binder = ConfigurationBinder::new(&self.catalog);
        binder.synthesize(&mut document, &order)?;
        if !binder.validate(&mut document) {
            document.save(&self.configuration_path)?;
            return Err(CommandError::InvalidConfiguration {
                path: self.configuration_path.display().to_string(),
            });
        }
        let variables = document.gathered_variables();

        let inventory = match &self.inventory_path {
            Some(path) => InventoryRef::File(path.clone()),
            None => InventoryRef::None,
        };
        let orchestrator = DeploymentOrchestrator::new(&self.catalog, engine, inventory);
        match only {
            Some(module) => {
                self.catalog.lookup(module)?;
                orchestrator.deploy_module(module, &variables).await?;
            }
            None => orchestrator.deploy_all(&order, &variables).await?,
        }
        Ok(())
    }

    /// Loads the selection and validates it, persisting annotations and
    /// failing when any entry is unknown or nothing is selected.
    fn checked_selection(&self) -> Result<Vec<String>, CommandError> {
        let mut selection = Selection::load(&self.selection_path)?;
        if selection.wanted_modules.is_empty() {
            return Err(CommandError::EmptySelection {
                path: self.selection_path.display().to_string(),
            });
        }
        if !ConfigurationBinder::new(&self.catalog).validate_selection(&mut selection) {
            selection.save(&self.selection_path)?;
            return Err(CommandError::InvalidSelection {
                path: self.selection_path.display().to_string(),
            });
        }
        Ok(selection.wanted_modules)
    }
}

impl CommandError {
    /// Process exit code for the CLI surface. Planning and validation
    /// failures are distinct from execution failures so wrapping scripts can
    /// tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Plan(PlanError::Cycle { .. }) => 2,
            CommandError::Execution(ExecutionError::Unexplained { .. }) => 4,
            CommandError::Execution(_) => 3,
            _ => 1,
        }
    }
}
