//! Error types for the core subsystem.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("watch catalog not found: {0}")]
    CatalogNotFound(PathBuf),

    #[error("watch catalog {0} contains no definitions")]
    CatalogEmpty(PathBuf),

    #[error("deserialization error: {0}")]
    DeserializeError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
