//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// Failures surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
