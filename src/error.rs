// ABOUTME: Application-wide error types for the deployer CLI and config layer.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::provision::ProvisionApiError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("operator API error: {0}")]
    Provision(#[from] ProvisionApiError),

    #[error("no provision found for call {0}")]
    ProvisionNotFound(u64),

    #[error("provisioning failed: {0}")]
    ProvisionFailed(String),

    #[error("provisioning timed out after {0:?}")]
    ProvisionTimeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
