use crate::catalog::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One play of a module's playbook template. Only the fields the planner
/// acts on are modeled; everything else round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub hosts: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, serde_yaml::Value>,
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_yaml::Value>,
}

/// A module's playbook with the gathered configuration variables merged into
/// every play, ready to hand to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedPlaybook {
    pub plays: Vec<Play>,
}

impl RenderedPlaybook {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| CatalogError::InvalidYaml {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Merges the full gathered configuration-variable map into every play's
    /// variable set. Gathered values win over template-level defaults.
    pub fn inject_vars(&mut self, variables: &BTreeMap<String, serde_yaml::Value>) {
        for play in &mut self.plays {
            for (name, value) in variables {
                play.vars.insert(name.clone(), value.clone());
            }
        }
    }

    /// Whether every play targets the literal `localhost` pattern, in which
    /// case the engine needs no inventory at all.
    pub fn localhost_only(&self) -> bool {
        self.plays.iter().all(|play| play.hosts == "localhost")
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playbook(yaml: &str) -> RenderedPlaybook {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn injected_vars_reach_every_play() {
        let mut playbook = playbook(
            "- hosts: localhost\n  tasks: []\n- hosts: webservers\n  vars:\n    existing: 1\n  tasks: []\n",
        );
        let mut vars = BTreeMap::new();
        vars.insert(
            "domain".to_string(),
            serde_yaml::Value::String("lab.local".to_string()),
        );
        playbook.inject_vars(&vars);
        for play in &playbook.plays {
            assert_eq!(
                play.vars.get("domain"),
                Some(&serde_yaml::Value::String("lab.local".to_string()))
            );
        }
        assert!(playbook.plays[1].vars.contains_key("existing"));
    }

    #[test]
    fn localhost_detection_requires_every_play() {
        assert!(playbook("- hosts: localhost\n  tasks: []\n").localhost_only());
        assert!(!playbook("- hosts: localhost\n  tasks: []\n- hosts: all\n  tasks: []\n")
            .localhost_only());
    }
}
