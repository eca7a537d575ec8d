// ABOUTME: Application-wide error types for cfstack.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::appstack::StackError;
use crate::deploy::DriverError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("appstack file not found in {0}")]
    AppstackNotFound(PathBuf),

    #[error("artifacts directory not found: {0}")]
    ArtifactsNotFound(PathBuf),

    #[error("cannot read artifact {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("malformed appstack: {0}")]
    Stack(#[from] StackError),

    #[error("deployment failed: {0}")]
    Deploy(#[from] DriverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
