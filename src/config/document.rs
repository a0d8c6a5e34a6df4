use crate::catalog::ModuleSummary;
use crate::config::DocumentError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The persisted, user-editable record of variable values bound to selected
/// modules. Rewritten in place with inline annotations when validation finds
/// bad entries, so the operator fixes and reruns instead of starting over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    #[serde(rename = "Modules", default)]
    pub modules: Vec<ModuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Required Variables", default)]
    pub variables: Vec<VariableEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Value", default)]
    pub value: serde_yaml::Value,
}

impl ConfigurationDocument {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        load_yaml(path)
    }

    /// Loads the document, or starts an empty one when the file does not
    /// exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, DocumentError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        save_yaml(path, self)
    }

    pub fn block(&self, module: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.name == module)
    }

    /// Flattens every block's variables into one map, in document order.
    /// A later block's value for a duplicated name overrides an earlier one.
    pub fn gathered_variables(&self) -> BTreeMap<String, serde_yaml::Value> {
        let mut variables = BTreeMap::new();
        for block in &self.modules {
            for entry in &block.variables {
                variables.insert(entry.name.clone(), entry.value.clone());
            }
        }
        variables
    }
}

/// The operator's module selection, round-tripped through YAML. The
/// `available_modules` section is regenerated from the catalog; invalid
/// `wanted_modules` entries are annotated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub wanted_modules: Vec<String>,
    #[serde(default)]
    pub available_modules: Vec<ModuleSummary>,
}

impl Selection {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        load_yaml(path)
    }

    pub fn load_or_default(path: &Path) -> Result<Self, DocumentError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        save_yaml(path, self)
    }
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|e| DocumentError::InvalidYaml {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn save_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), DocumentError> {
    let content = serde_yaml::to_string(value).map_err(|e| DocumentError::Serialize {
        reason: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(|e| DocumentError::io(path, e))
}
