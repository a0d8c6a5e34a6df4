use crate::catalog::{CatalogError, ModuleCatalog};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Deterministic role name -> location table shared by every module run.
///
/// Built once before the first module executes and read-only afterwards.
/// Modules are processed in deployment order and the first writer of a role
/// name wins; a later module exposing the same role name is reported as a
/// non-fatal warning and skipped. Collisions are never resolved by
/// reordering modules; that is a known, tracked gap.
#[derive(Debug, Default)]
pub struct RoleNamespace {
    roles: BTreeMap<String, PathBuf>,
}

impl RoleNamespace {
    pub fn build(catalog: &ModuleCatalog, order: &[String]) -> Result<Self, CatalogError> {
        let mut roles: BTreeMap<String, PathBuf> = BTreeMap::new();
        for module in order {
            let dir = catalog.roles_dir(module);
            if !dir.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(&dir).map_err(|e| CatalogError::io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| CatalogError::io(&dir, e))?;
                if !entry.path().is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                match roles.get(&name) {
                    Some(existing) => warn!(
                        role = %name,
                        module = %module,
                        kept = %existing.display(),
                        "role name collision, keeping the first writer"
                    ),
                    None => {
                        debug!(role = %name, module = %module, "role registered");
                        roles.insert(name, entry.path());
                    }
                }
            }
        }
        Ok(Self { roles })
    }

    pub fn get(&self, role: &str) -> Option<&PathBuf> {
        self.roles.get(role)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Unique parent directories of every registered role, sorted, for the
    /// engine's role search path.
    pub fn search_path(&self) -> Vec<PathBuf> {
        let mut parents: Vec<PathBuf> = self
            .roles
            .values()
            .filter_map(|path| path.parent().map(PathBuf::from))
            .collect();
        parents.sort();
        parents.dedup();
        parents
    }
}
