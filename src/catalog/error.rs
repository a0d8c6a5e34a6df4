use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Module catalog directory not found: {path}")]
    CatalogNotFound { path: String },

    #[error("Unknown module: {module}")]
    ModuleNotFound { module: String },

    #[error("Module '{module}' spec is missing its '{section}' section")]
    MissingSection { module: String, section: String },

    #[error(
        "Module '{module}' variable '{variable}' has a default that is not of type {expected}"
    )]
    InvalidDefault {
        module: String,
        variable: String,
        expected: String,
    },

    #[error("Invalid YAML in '{path}': {reason}")]
    InvalidYaml { path: String, reason: String },

    #[error("IO error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
