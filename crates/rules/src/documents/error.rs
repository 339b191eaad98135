//! Error types and per-file load outcomes for the document store.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Readable YAML that is not a usable document.
    #[error("invalid document: {0}")]
    Invalid(String),

    /// The document failed finalize-time validation.
    #[error("document '{id}' has {errors} validation error(s)")]
    Validation { id: String, errors: usize },

    #[error("no document file found for id '{0}'")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug, PartialEq)]
pub enum LoadStatus {
    Loaded { id: String },
    /// Dotfile or non-YAML file.
    Skipped { reason: String },
    Failed { error: String },
}

impl LoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed { .. })
    }
}
