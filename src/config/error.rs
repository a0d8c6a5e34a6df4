use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid YAML in '{path}': {reason}")]
    InvalidYaml { path: String, reason: String },

    #[error("Failed to serialize document: {reason}")]
    Serialize { reason: String },

    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        DocumentError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
