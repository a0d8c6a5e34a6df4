use crate::catalog::{CatalogError, ModuleCatalog};
use crate::config::{ConfigurationDocument, ModuleConfig, Selection, VariableEntry};
use tracing::{debug, warn};

/// Separator between a stored name and an inline diagnostic. Validation
/// strips any existing annotation before re-checking, so a corrected entry
/// loses its stale diagnostic on the next run.
const ANNOTATION_MARKER: &str = " <-- ";

/// Binds a configuration document to the selected modules' variable
/// declarations: synthesizes default-populated blocks and validates/annotates
/// user-edited entries in place.
pub struct ConfigurationBinder<'a> {
    catalog: &'a ModuleCatalog,
}

impl<'a> ConfigurationBinder<'a> {
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Appends a block populated with declared defaults for every selected
    /// module not already present. Existing blocks are never touched, so an
    /// operator's edits survive re-synthesis.
    pub fn synthesize(
        &self,
        document: &mut ConfigurationDocument,
        selection: &[String],
    ) -> Result<(), CatalogError> {
        for name in selection {
            if document.block(name).is_some() {
                continue;
            }
            let spec = self.catalog.lookup(name)?;
            debug!(module = %name, "synthesizing configuration block");
            document.modules.push(ModuleConfig {
                name: spec.name.clone(),
                variables: spec
                    .required_variables
                    .iter()
                    .map(|variable| VariableEntry {
                        name: variable.name.clone(),
                        description: variable.description.clone(),
                        value: variable.default.clone(),
                    })
                    .collect(),
            });
        }
        Ok(())
    }

    /// Checks every entry of every block against the owning module's declared
    /// variables. Violations never abort the pass: each offending entry's
    /// stored name gains an inline diagnostic and validation continues, so
    /// all problems surface in one run. Returns overall validity; a valid
    /// document is left untouched.
    pub fn validate(&self, document: &mut ConfigurationDocument) -> bool {
        let mut valid = true;
        for block in &mut document.modules {
            let module_name = strip_annotation(&block.name).to_string();
            let spec = match self.catalog.lookup(&module_name) {
                Ok(spec) => spec,
                Err(_) => {
                    warn!(module = %module_name, "configuration names an unknown module");
                    block.name = format!("{module_name}{ANNOTATION_MARKER}Unknown module");
                    valid = false;
                    continue;
                }
            };
            block.name = module_name;

            let declared: Vec<&str> = spec
                .required_variables
                .iter()
                .map(|v| v.name.as_str())
                .collect();
            for entry in &mut block.variables {
                let name = strip_annotation(&entry.name).to_string();
                let Some(variable) = spec.required_variables.iter().find(|v| v.name == name)
                else {
                    entry.name = format!(
                        "{name}{ANNOTATION_MARKER}Invalid variable name, valid names are: [{}]",
                        declared.join(", ")
                    );
                    valid = false;
                    continue;
                };

                if variable.var_type.matches(&entry.value) {
                    entry.name = name;
                } else {
                    entry.name = format!(
                        "{name}{ANNOTATION_MARKER}Value must be of type {}",
                        variable.var_type
                    );
                    valid = false;
                }
            }
        }
        valid
    }

    /// Rewrites the selection's catalog listing from the modules actually on
    /// disk.
    pub fn refresh_available(&self, selection: &mut Selection) {
        selection.available_modules = self.catalog.summaries();
    }

    /// Annotates `wanted_modules` entries that name no catalog module, in
    /// place. Same accumulate-everything contract as [`Self::validate`].
    pub fn validate_selection(&self, selection: &mut Selection) -> bool {
        let mut valid = true;
        for wanted in &mut selection.wanted_modules {
            let name = strip_annotation(wanted).to_string();
            if self.catalog.contains(&name) {
                *wanted = name;
            } else {
                *wanted = format!(
                    "{name}{ANNOTATION_MARKER}Unknown module, no catalog entry with this name"
                );
                valid = false;
            }
        }
        valid
    }
}

fn strip_annotation(name: &str) -> &str {
    name.split(ANNOTATION_MARKER).next().unwrap_or(name)
}
