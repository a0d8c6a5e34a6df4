use crate::catalog::{CatalogError, ModuleSpec, ModuleSummary, VariableSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk shape of a module's `requirements.yaml`. Sections are optional at
/// parse time so their absence can be reported per module rather than as an
/// opaque YAML error.
#[derive(Debug, Deserialize)]
struct RawRequirements {
    #[serde(default)]
    description: Option<String>,
    dependencies: Option<Vec<String>>,
    required_variables: Option<Vec<VariableSpec>>,
}

/// Loads every module spec from the catalog directory exactly once and owns
/// the resulting [`ModuleSpec`] instances for the lifetime of the run.
///
/// Catalog layout: one directory per module under the root, each holding
/// `requirements.yaml`, `playbook.yaml`, and a `roles/` bundle.
#[derive(Debug)]
pub struct ModuleCatalog {
    root: PathBuf,
    modules: BTreeMap<String, ModuleSpec>,
}

impl ModuleCatalog {
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CatalogError::CatalogNotFound {
                path: root.display().to_string(),
            });
        }

        let mut modules = BTreeMap::new();
        let entries = std::fs::read_dir(&root).map_err(|e| CatalogError::io(&root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CatalogError::io(&root, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let spec = Self::load_spec(&entry.path(), &name)?;
            debug!(module = %name, "loaded module spec");
            modules.insert(name, spec);
        }

        Ok(Self { root, modules })
    }

    /// Test/seed constructor for a catalog that never touches the filesystem.
    pub fn from_specs(specs: impl IntoIterator<Item = ModuleSpec>) -> Self {
        Self {
            root: PathBuf::new(),
            modules: specs.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    fn load_spec(module_dir: &Path, name: &str) -> Result<ModuleSpec, CatalogError> {
        let path = module_dir.join("requirements.yaml");
        let content = std::fs::read_to_string(&path).map_err(|e| CatalogError::io(&path, e))?;
        let raw: RawRequirements =
            serde_yaml::from_str(&content).map_err(|e| CatalogError::InvalidYaml {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let dependencies = raw.dependencies.ok_or_else(|| CatalogError::MissingSection {
            module: name.to_string(),
            section: "dependencies".to_string(),
        })?;
        let required_variables =
            raw.required_variables
                .ok_or_else(|| CatalogError::MissingSection {
                    module: name.to_string(),
                    section: "required_variables".to_string(),
                })?;

        // Defaults feed synthesized configuration documents, so a default
        // that fails its own declared type would make every fresh document
        // invalid. Reject it at load.
        for variable in &required_variables {
            if !variable.var_type.matches(&variable.default) {
                return Err(CatalogError::InvalidDefault {
                    module: name.to_string(),
                    variable: variable.name.clone(),
                    expected: variable.var_type.to_string(),
                });
            }
        }

        Ok(ModuleSpec {
            name: name.to_string(),
            description: raw.description.unwrap_or_default(),
            dependencies,
            required_variables,
        })
    }

    pub fn lookup(&self, name: &str) -> Result<&ModuleSpec, CatalogError> {
        self.modules
            .get(name)
            .ok_or_else(|| CatalogError::ModuleNotFound {
                module: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Catalog listing, sorted by module name.
    pub fn summaries(&self) -> Vec<ModuleSummary> {
        self.modules
            .values()
            .map(|spec| ModuleSummary {
                name: spec.name.clone(),
                description: spec.description.clone(),
            })
            .collect()
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn playbook_path(&self, module: &str) -> PathBuf {
        self.root.join(module).join("playbook.yaml")
    }

    pub fn roles_dir(&self, module: &str) -> PathBuf {
        self.root.join(module).join("roles")
    }
}
