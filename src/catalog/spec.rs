use serde::{Deserialize, Serialize};
use std::fmt;

/// Declarative metadata for one deployable module. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dependencies: Vec<String>,
    pub required_variables: Vec<VariableSpec>,
}

impl ModuleSpec {
    /// Dependencies that actually constrain ordering. An empty list or the
    /// sentinel entry `None` declares a module with no prerequisites.
    pub fn effective_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .map(|d| d.as_str())
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("none"))
    }
}

/// One configuration variable a module requires, with its declared type and
/// the default written into synthesized configuration documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    pub default: serde_yaml::Value,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    List,
    Integer,
    Boolean,
    Mapping,
}

impl VariableType {
    /// Whether a configured value satisfies this declared type.
    pub fn matches(&self, value: &serde_yaml::Value) -> bool {
        match self {
            VariableType::String => value.is_string(),
            VariableType::List => value.is_sequence(),
            VariableType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            VariableType::Boolean => value.is_bool(),
            VariableType::Mapping => value.is_mapping(),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableType::String => "string",
            VariableType::List => "list",
            VariableType::Integer => "integer",
            VariableType::Boolean => "boolean",
            VariableType::Mapping => "mapping",
        };
        write!(f, "{name}")
    }
}

/// Catalog listing entry, round-tripped through the selection file's
/// `available_modules` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
}
